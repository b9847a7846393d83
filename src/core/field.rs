//! Field value types and validation

use crate::core::format::{parse_duration, parse_local_datetime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// A primitive field value as delivered by the record source
///
/// Dates and times travel as strings; their interpretation is decided by the
/// [`FieldKind`] a view assigns to the field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl FieldValue {
    /// Get the value as a string slice if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number, parsing numeric strings
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Null or a string with nothing but whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

/// How a view interprets a field for display, sorting and date filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    /// Elapsed time, either seconds or `HH:MM:SS[.fff]`
    Duration,
    /// Calendar date or timestamp
    Date,
    /// Time of day or timestamp shown as a clock time
    Time,
}

/// Field format validators applied at the record store boundary
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Number,
    Duration,
    Date,
    Time,
    Uuid,
    Custom(Regex),
}

impl FieldFormat {
    /// The validator matching a field kind, if the kind constrains the value
    pub fn for_kind(kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Text => None,
            FieldKind::Number => Some(FieldFormat::Number),
            FieldKind::Duration => Some(FieldFormat::Duration),
            FieldKind::Date => Some(FieldFormat::Date),
            FieldKind::Time => Some(FieldFormat::Time),
        }
    }

    /// Validate a field value against this format
    ///
    /// Null values are not judged here; required-ness is a schema concern.
    pub fn validate(&self, value: &FieldValue) -> bool {
        if value.is_null() {
            return true;
        }

        match self {
            FieldFormat::Number => value.as_f64().is_some(),
            FieldFormat::Duration => parse_duration(value).is_some(),
            FieldFormat::Date => value.as_str().is_some_and(is_date_like),
            FieldFormat::Time => value.as_str().is_some_and(|s| is_clock(s) || is_date_like(s)),
            FieldFormat::Uuid => value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok()),
            FieldFormat::Custom(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
        }
    }
}

fn is_clock(s: &str) -> bool {
    static CLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = CLOCK_REGEX.get_or_init(|| {
        Regex::new(r"^\d{1,3}:[0-5]\d(:[0-5]\d(\.\d+)?)?$").expect("clock pattern is valid")
    });
    regex.is_match(s.trim())
}

/// Accepted exactly when the display and filter code can read it
fn is_date_like(s: &str) -> bool {
    parse_local_datetime(s).is_some()
}
