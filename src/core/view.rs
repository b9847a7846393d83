//! Tabular view controller: filter, sort, paginate and export over a record collection
//!
//! A [`TableView`] owns the user-driven state of one page (filter, sort and
//! page position) and derives everything else from the collection it is
//! handed. It never mutates records.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut view = TableView::new(ViewConfig::history());
//! view.set_search("dela cruz");
//! view.set_facet(Some("CVSU".to_string()));
//!
//! let records = store.records();
//! let page = view.page(&records);
//! println!("{}", page.summary());
//!
//! let payload = view.export(&records, ExportFormat::Csv)?;
//! ```

use crate::config::ViewConfig;
use crate::core::collate::same_text;
use crate::core::error::ExportError;
use crate::core::export::{ExportFormat, ExportJob, ExportPayload};
use crate::core::filter::{
    DateFilter, FACET_ALL, FilterSpec, FilterState, filter_records, unique_facet_values,
};
use crate::core::format::display_value;
use crate::core::paginate::{Page, PageControl, PageState, page_window, paginate};
use crate::core::record::Record;
use crate::core::sort::{SortDirection, SortKey, SortState, sort_records};

/// Controller for one configured table
#[derive(Debug, Clone)]
pub struct TableView {
    config: ViewConfig,
    spec: FilterSpec,
    filter: FilterState,
    sort: Option<SortState>,
    page: PageState,
}

impl TableView {
    pub fn new(config: ViewConfig) -> Self {
        let spec = config.filter_spec();
        let sort = config
            .default_sort
            .as_deref()
            .and_then(|label| config.sort_key(label))
            .map(|key| SortState {
                key: key.label.clone(),
                direction: key.direction,
            });
        let page = PageState::new(config.page_size);

        Self {
            config,
            spec,
            filter: FilterState::default(),
            sort,
            page,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    fn reset_page(&mut self) {
        self.page.current_page = 1;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
        self.reset_page();
    }

    /// Select a facet value; `None` or "All" shows every value
    pub fn set_facet(&mut self, facet: Option<String>) {
        self.filter.facet = facet;
        self.reset_page();
    }

    pub fn set_date(&mut self, date: Option<DateFilter>) {
        self.filter.date = date;
        self.reset_page();
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
        self.reset_page();
    }

    /// Drop the facet selection if it names a value that no longer exists
    pub fn forget_facet(&mut self, value: &str) {
        let selected = self
            .filter
            .active_facet()
            .is_some_and(|f| same_text(f, value));
        if selected {
            self.set_facet(Some(FACET_ALL.to_string()));
        }
    }

    /// Sort by the key with this label, in the key's default direction
    ///
    /// A label no key carries is kept and leaves records in collection order.
    pub fn set_sort(&mut self, label: impl Into<String>) {
        let key = label.into();
        let direction = self
            .config
            .sort_key(&key)
            .map(|k| k.direction)
            .unwrap_or_default();
        self.sort = Some(SortState { key, direction });
        self.reset_page();
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        if let Some(sort) = self.sort.as_mut() {
            sort.direction = direction;
        }
        self.reset_page();
    }

    /// Select a key, or flip the direction when it is already selected
    pub fn toggle_sort(&mut self, label: &str) {
        let Some(sort) = self.sort.as_mut().filter(|s| s.key == label) else {
            self.set_sort(label);
            return;
        };
        sort.direction = sort.direction.reversed();
        self.reset_page();
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.reset_page();
    }

    /// Change the page size and go back to the first page
    ///
    /// A zero size is accepted and shows an empty page without controls.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page = PageState::new(page_size);
    }

    fn active_sort_key(&self) -> Option<(&SortKey, SortDirection)> {
        let sort = self.sort.as_ref()?;
        self.config
            .sort_key(&sort.key)
            .map(|key| (key, sort.direction))
    }

    /// The full filtered and ordered collection, ignoring pagination
    pub fn visible<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        let filtered = filter_records(records, &self.spec, &self.filter);
        match self.active_sort_key() {
            Some((key, direction)) => sort_records(&filtered, Some(key), direction),
            None => filtered,
        }
    }

    pub fn filtered_count(&self, records: &[Record]) -> usize {
        filter_records(records, &self.spec, &self.filter).len()
    }

    /// Clamp the current page against the collection, e.g. after a delete
    ///
    /// Returns whether the page moved.
    pub fn refresh(&mut self, records: &[Record]) -> bool {
        let total = self.filtered_count(records);
        let moved = self.page.clamp(total);
        if moved {
            tracing::debug!(
                view = %self.config.name,
                page = self.page.current_page,
                total,
                "Clamped current page"
            );
        }
        moved
    }

    /// The current page, clamping the page position first
    pub fn page<'a>(&mut self, records: &'a [Record]) -> Page<&'a Record> {
        let visible = self.visible(records);
        self.page.clamp(visible.len());
        paginate(&visible, self.page.page_size, self.page.current_page)
    }

    pub fn next_page(&mut self, records: &[Record]) {
        let total = self.filtered_count(records);
        self.page.next(total);
    }

    pub fn previous_page(&mut self) {
        self.page.previous();
    }

    pub fn go_to_page(&mut self, page: usize, records: &[Record]) {
        let total = self.filtered_count(records);
        self.page.go_to(page, total);
    }

    /// Page-number strip for a rendered page
    ///
    /// Empty when the page controls should be hidden.
    pub fn page_controls<T>(&self, page: &Page<T>) -> Vec<PageControl> {
        if !page.shows_controls() {
            return Vec::new();
        }
        page_window(
            page.current_page,
            page.total_pages,
            self.config.max_pages_to_show,
        )
    }

    /// Facet choices for the dropdown: "All" followed by the distinct values
    pub fn facet_options(&self, records: &[Record]) -> Vec<String> {
        let Some(field) = self.config.facet_field.as_deref() else {
            return Vec::new();
        };
        std::iter::once(FACET_ALL.to_string())
            .chain(unique_facet_values(records, field))
            .collect()
    }

    pub fn headers(&self) -> Vec<String> {
        self.config
            .export
            .row_number_header
            .iter()
            .cloned()
            .chain(self.config.columns.iter().map(|c| c.label.clone()))
            .collect()
    }

    /// Displayed cells of one record, one per column
    pub fn row_cells(&self, record: &Record) -> Vec<String> {
        self.config
            .columns
            .iter()
            .map(|column| {
                record
                    .get(&column.field)
                    .map(|value| display_value(value, column.kind))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Snapshot of the whole filtered collection for export
    pub fn export_job(&self, records: &[Record]) -> Result<ExportJob, ExportError> {
        let numbered = self.config.export.row_number_header.is_some();
        let rows = self
            .visible(records)
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let cells = self.row_cells(record);
                if numbered {
                    std::iter::once((index + 1).to_string()).chain(cells).collect()
                } else {
                    cells
                }
            })
            .collect();

        ExportJob::new(
            self.headers(),
            rows,
            self.config.export.filename.clone(),
            self.config.export.title.clone(),
        )
    }

    pub fn export(
        &self,
        records: &[Record],
        format: ExportFormat,
    ) -> Result<ExportPayload, ExportError> {
        self.export_job(records)?.render(format)
    }
}
