//! Record filtering: free-text search, categorical facet and calendar-day date filter

use crate::core::collate::{case_key, same_text};
use crate::core::field::FieldKind;
use crate::core::format::{display_value, local_day};
use crate::core::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Facet value that disables facet filtering
pub const FACET_ALL: &str = "All";

/// A field searched by the free-text term, matched against its displayed form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchField {
    pub name: String,

    #[serde(default)]
    pub kind: FieldKind,
}

impl SearchField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Which fields a view filters on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub search_fields: Vec<SearchField>,
    pub facet_field: Option<String>,
    pub date_field: Option<String>,
}

/// Calendar-day date filter, compared in the local calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Day(NaiveDate),
    /// Inclusive on both ends
    Range { start: NaiveDate, end: NaiveDate },
}

impl DateFilter {
    pub fn contains(&self, day: NaiveDate) -> bool {
        match *self {
            DateFilter::Day(d) => d == day,
            DateFilter::Range { start, end } => start <= day && day <= end,
        }
    }
}

/// User-driven filter inputs; created empty when a view mounts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub facet: Option<String>,
    pub date: Option<DateFilter>,
}

impl FilterState {
    /// The facet value in effect, `None` when unset or the "All" sentinel
    pub fn active_facet(&self) -> Option<&str> {
        self.facet
            .as_deref()
            .filter(|f| !f.trim().is_empty() && !same_text(f, FACET_ALL))
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty() && self.active_facet().is_none() && self.date.is_none()
    }
}

/// Whether a record is visible under the filter; all active predicates are ANDed
///
/// A missing or blank field used by an active predicate makes that predicate fail.
pub fn matches(record: &Record, spec: &FilterSpec, state: &FilterState) -> bool {
    matches_search(record, spec, &state.search_term)
        && matches_facet(record, spec, state.active_facet())
        && matches_date(record, spec, state.date.as_ref())
}

fn matches_search(record: &Record, spec: &FilterSpec, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    spec.search_fields.iter().any(|field| {
        record
            .get(&field.name)
            .filter(|v| !v.is_blank())
            .is_some_and(|v| display_value(v, field.kind).to_lowercase().contains(&term))
    })
}

fn matches_facet(record: &Record, spec: &FilterSpec, facet: Option<&str>) -> bool {
    let (Some(facet), Some(field)) = (facet, spec.facet_field.as_deref()) else {
        return true;
    };

    record
        .text(field)
        .is_some_and(|value| same_text(&value, facet))
}

fn matches_date(record: &Record, spec: &FilterSpec, date: Option<&DateFilter>) -> bool {
    let (Some(date), Some(field)) = (date, spec.date_field.as_deref()) else {
        return true;
    };

    record
        .text(field)
        .and_then(|value| local_day(&value))
        .is_some_and(|day| date.contains(day))
}

/// The records visible under the filter, in their original order
pub fn filter_records<'a>(
    records: &'a [Record],
    spec: &FilterSpec,
    state: &FilterState,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| matches(record, spec, state))
        .collect()
}

/// Distinct values of a facet field, deduplicated case-insensitively
///
/// The first spelling seen wins and values keep first-seen order. Blank values
/// are skipped.
pub fn unique_facet_values(records: &[Record], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| record.text(field))
        .filter(|value| seen.insert(case_key(value)))
        .collect()
}
