//! Shared test harness for record source and view testing
//!
//! Provides builders for the record shapes the dashboard pages use
//! (interns, attendance, history) and small assertion helpers.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod source_harness;
//! use source_harness::*;
//! ```

#![allow(dead_code)]

pub mod record_source_tests;

use tabview::core::field::FieldValue;
use tabview::core::record::Record;

/// Route the crate's tracing events to the test output
///
/// `RUST_LOG` overrides the default level. Safe to call from every test.
pub fn init_test_tracing() {
    tabview::init_tracing("tabview=warn");
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// An intern record without identity, as a registration form submits it
pub fn new_intern(name: &str, school: &str) -> Record {
    Record::new()
        .with("intern_name", name)
        .with("school_name", school)
        .with("shift_name", "Morning")
        .with("total_hours", 0_i64)
        .with("status", "Active")
}

/// An intern history row with a fixed id
pub fn history_row(i: usize, abbreviation: &str, hours: i64) -> Record {
    Record::new()
        .with("intern_id", format!("intern-{:03}", i))
        .with("intern_name", format!("Intern {:03}", i))
        .with("school_name", format!("{} University", abbreviation))
        .with("abbreviation", abbreviation)
        .with("shift_name", "Morning")
        .with("total_hours", hours)
        .with("status", "Completed")
        .with("remarks", "N/A")
}

/// `n` history rows alternating between CVSU and UPLB
pub fn history_batch(n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| {
            let school = if i % 2 == 0 { "CVSU" } else { "UPLB" };
            history_row(i, school, (i as i64) * 3_600)
        })
        .collect()
}

/// An attendance row for a given timestamp
pub fn attendance_row(id: i64, name: &str, date: &str, status: &str) -> Record {
    Record::new()
        .with("attendance_id", id)
        .with("intern_id", format!("intern-{:03}", id))
        .with("intern_name", name)
        .with("school_name", "CVSU")
        .with("attendance_date", date)
        .with("time_in", "08:00:00")
        .with("time_out", "17:00:00")
        .with("total_hours", 32_400_i64)
        .with("check_in", status)
        .with("remarks", "N/A")
}

/// `n` attendance rows on consecutive August 2025 days
pub fn attendance_batch(n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| {
            attendance_row(
                i as i64,
                &format!("Intern {:02}", i),
                &format!("2025-08-{:02}T08:00:00", (i - 1) % 28 + 1),
                "Regular Hours",
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

/// Assert that a list contains exactly `n` items.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

/// Assert that a field holds the expected string.
pub fn assert_field_string(record: &Record, field: &str, expected: &str) {
    match record.get(field) {
        Some(FieldValue::String(s)) => assert_eq!(s, expected),
        other => panic!(
            "Expected {} = FieldValue::String(\"{}\"), got {:?}",
            field, expected, other
        ),
    }
}

/// Ids of records under `id_field`, in order.
pub fn ids(records: &[&Record], id_field: &str) -> Vec<String> {
    records.iter().filter_map(|r| r.id(id_field)).collect()
}
