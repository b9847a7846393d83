//! Pagination of an ordered collection and the page-number window for navigation

use serde::{Deserialize, Serialize};

/// Default number of page-number controls before the window collapses
pub const DEFAULT_MAX_PAGES_TO_SHOW: usize = 5;

/// Page position of a view
///
/// `current_page` starts at 1. Reset to 1 when filters change, clamped when
/// the collection shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size,
        }
    }

    /// Pull `current_page` back into range after `total` changed
    ///
    /// Returns whether the page moved.
    pub fn clamp(&mut self, total: usize) -> bool {
        let target = clamp_page(self.current_page, total_pages(total, self.page_size));
        let moved = target != self.current_page;
        self.current_page = target;
        moved
    }

    /// Go back one page; no-op on the first page
    pub fn previous(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    /// Advance one page; no-op on the last page
    pub fn next(&mut self, total: usize) {
        if self.current_page < total_pages(total, self.page_size) {
            self.current_page += 1;
        }
    }

    /// Jump to a page, clamped into `1..=total_pages`
    pub fn go_to(&mut self, page: usize, total: usize) {
        self.current_page = clamp_page(page, total_pages(total, self.page_size));
    }
}

/// `ceil(total / page_size)`, 0 for an empty collection or a zero page size
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 || total == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Clamp a page number into `1..=max(1, total_pages)`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// One page of an ordered collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in the half-open range `[start_index, end_index)`
    pub items: Vec<T>,
    pub start_index: usize,
    pub end_index: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub current_page: usize,
}

impl<T> Page<T> {
    /// Whether page controls should be rendered at all
    pub fn shows_controls(&self) -> bool {
        self.total_pages > 1
    }

    /// "Showing {start} to {end} of {total} entries"
    pub fn summary(&self) -> String {
        summary(self.start_index, self.end_index, self.total_count)
    }

    pub fn meta(&self, page_size: usize) -> PaginationMeta {
        PaginationMeta::new(self.current_page, page_size, self.total_count)
    }
}

/// Entry-count summary line shown beside the page controls
///
/// An empty collection reads "Showing 0 to 0 of 0 entries".
pub fn summary(start_index: usize, end_index: usize, total_count: usize) -> String {
    let first = if total_count == 0 { 0 } else { start_index + 1 };
    format!(
        "Showing {} to {} of {} entries",
        first, end_index, total_count
    )
}

/// Slice one page out of an ordered collection
///
/// `current_page` is read as-is; callers keep it clamped through
/// [`PageState::clamp`]. A page past the end yields no items. A zero
/// `page_size` yields an empty page with no pagination.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, current_page: usize) -> Page<T> {
    let total_count = items.len();
    let pages = total_pages(total_count, page_size);
    let current_page = current_page.max(1);

    if page_size == 0 {
        return Page {
            items: Vec::new(),
            start_index: 0,
            end_index: 0,
            total_pages: 0,
            total_count,
            current_page,
        };
    }

    let start_index = (current_page - 1).saturating_mul(page_size).min(total_count);
    let end_index = start_index.saturating_add(page_size).min(total_count);

    Page {
        items: items[start_index..end_index].to_vec(),
        start_index,
        end_index,
        total_pages: pages,
        total_count,
        current_page,
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        let total_pages = total_pages(total, limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One clickable control in the page-number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Page(usize),
    Ellipsis,
}

/// Page numbers to render for navigation
///
/// Up to `max_pages_to_show` pages are listed in full. Beyond that the strip
/// is: page 1, an ellipsis when `current_page > 3`, the neighbours of the
/// current page, an ellipsis when `current_page < total_pages - 2`, and the
/// last page.
pub fn page_window(
    current_page: usize,
    total_pages: usize,
    max_pages_to_show: usize,
) -> Vec<PageControl> {
    if total_pages <= max_pages_to_show {
        return (1..=total_pages).map(PageControl::Page).collect();
    }

    let current_page = clamp_page(current_page, total_pages);
    let mut controls = vec![PageControl::Page(1)];

    if current_page > 3 {
        controls.push(PageControl::Ellipsis);
    }

    let start = current_page.saturating_sub(1).max(2);
    let end = (current_page + 1).min(total_pages - 1);
    controls.extend((start..=end).map(PageControl::Page));

    if current_page + 2 < total_pages {
        controls.push(PageControl::Ellipsis);
    }

    controls.push(PageControl::Page(total_pages));
    controls
}
