//! Stable, non-mutating ordering of filtered records

use crate::core::collate::collation_key;
use crate::core::field::{FieldKind, FieldValue};
use crate::core::format::{parse_duration, parse_local_datetime};
use crate::core::record::Record;
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicase::UniCase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A sortable field offered by a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    /// Label shown in the sort selector, e.g. "University"
    pub label: String,

    /// Record field the label sorts by
    pub field: String,

    #[serde(default)]
    pub kind: FieldKind,

    /// Direction used when the key is first selected
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(label: impl Into<String>, field: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            kind,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Descending;
        self
    }
}

/// Current sort selection of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    /// Label of the selected [`SortKey`]
    pub key: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Text { folded: UniCase<String>, raw: String },
    Number(f64),
    Instant(NaiveDateTime),
}

impl SortValue {
    fn extract(value: Option<&FieldValue>, kind: FieldKind) -> Option<Self> {
        let value = value.filter(|v| !v.is_blank())?;
        match kind {
            FieldKind::Text => {
                let raw = value.to_string();
                Some(SortValue::Text {
                    folded: collation_key(&raw),
                    raw,
                })
            }
            FieldKind::Number => value.as_f64().map(SortValue::Number),
            FieldKind::Duration => parse_duration(value).map(SortValue::Number),
            FieldKind::Date => parse_local_datetime(&value.to_string()).map(SortValue::Instant),
            FieldKind::Time => clock_seconds(&value.to_string()).map(SortValue::Number),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                SortValue::Text { folded: a, raw: ra },
                SortValue::Text { folded: b, raw: rb },
            ) => a.cmp(b).then_with(|| ra.cmp(rb)),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Instant(a), SortValue::Instant(b)) => a.cmp(b),
            // A key always extracts one variant per kind
            _ => Ordering::Equal,
        }
    }
}

fn clock_seconds(s: &str) -> Option<f64> {
    let time = NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M"))
        .ok()
        .or_else(|| parse_local_datetime(s).map(|dt| dt.time()))?;
    Some(time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9)
}

/// Order records by a key, returning a new sequence
///
/// Blank or unparseable values sort after present ones in either direction.
/// Equal keys keep their input order, so re-sorting is idempotent. Without a
/// key the input order is returned unchanged.
pub fn sort_records<'a>(
    records: &[&'a Record],
    key: Option<&SortKey>,
    direction: SortDirection,
) -> Vec<&'a Record> {
    let Some(key) = key else {
        return records.to_vec();
    };

    let mut keyed: Vec<(Option<SortValue>, &'a Record)> = records
        .iter()
        .map(|record| (SortValue::extract(record.get(&key.field), key.kind), *record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}
