//! Display formatting and parsing of dates, clock times and durations
//!
//! Timestamps carrying an offset are converted to the local calendar; naive
//! timestamps and plain dates are taken as already local.

use crate::core::field::{FieldKind, FieldValue};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse a date or timestamp string into local wall-clock time
///
/// Plain dates resolve to local midnight.
pub fn parse_local_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// The local calendar day a date or timestamp falls on
pub fn local_day(s: &str) -> Option<NaiveDate> {
    parse_local_datetime(s).map(|dt| dt.date())
}

/// Format as "Aug 12, 2025"
pub fn format_date(s: &str) -> Option<String> {
    parse_local_datetime(s).map(|dt| dt.format("%b %d, %Y").to_string())
}

/// Format as "02:15:34 PM", accepting timestamps or bare clock times
pub fn format_time(s: &str) -> Option<String> {
    let s = s.trim();
    let time = TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
        .or_else(|| parse_local_datetime(s).map(|dt| dt.time()))?;
    Some(time.format("%I:%M:%S %p").to_string())
}

/// Parse a duration into seconds
///
/// Accepts numbers of seconds, `HH:MM`, `HH:MM:SS[.fff]` and the
/// `N day(s), HH:MM:SS` form some backends emit for intervals.
pub fn parse_duration(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Float(f) => Some(*f),
        FieldValue::String(s) => parse_duration_str(s),
        _ => None,
    }
}

fn parse_duration_str(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<f64>() {
        return Some(secs);
    }

    let (days, clock) = match s.split_once(',') {
        Some((day_part, rest)) => {
            let count = day_part.split_whitespace().next()?.parse::<f64>().ok()?;
            (count, rest.trim())
        }
        None => (0.0, s),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (h.parse::<f64>().ok()?, m.parse::<f64>().ok()?, 0.0),
        [h, m, sec] => (
            h.parse::<f64>().ok()?,
            m.parse::<f64>().ok()?,
            sec.parse::<f64>().ok()?,
        ),
        _ => return None,
    };

    Some(days * 86_400.0 + hours * 3_600.0 + minutes * 60.0 + seconds)
}

/// Format seconds as `HH:MM:SS.ss`
///
/// Hours are not wrapped at 24, so long totals read as accumulated hours.
pub fn format_duration(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    let hours = centis / 360_000;
    let minutes = (centis / 6_000) % 60;
    let secs = centis % 6_000;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        hours,
        minutes,
        secs / 100,
        secs % 100
    )
}

/// Render a field value the way a table cell shows it
///
/// Values that do not parse under their kind are shown verbatim.
pub fn display_value(value: &FieldValue, kind: FieldKind) -> String {
    if value.is_null() {
        return String::new();
    }

    let raw = value.to_string();
    match kind {
        FieldKind::Text | FieldKind::Number => raw,
        FieldKind::Duration => parse_duration(value).map(format_duration).unwrap_or(raw),
        FieldKind::Date => format_date(&raw).unwrap_or(raw),
        FieldKind::Time => format_time(&raw).unwrap_or(raw),
    }
}
