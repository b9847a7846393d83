//! Macro-generated test suite for `RecordSource` contract validation.
//!
//! The `record_source_tests!` macro generates a test module that validates any
//! `RecordSource` keyed by `intern_id` against the full contract: listing,
//! creation with identity assignment, partial updates, deletes, bulk deletes
//! by facet, concurrent access, and use behind a `RecordStore`.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod source_harness;
//!
//! use source_harness::*;
//! use tabview::storage::InMemoryRecordSource;
//!
//! record_source_tests!(InMemoryRecordSource::new("intern_id"));
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_list_empty`: list on empty source returns empty vec
//! - `test_create_assigns_identity`: created record carries an id
//! - `test_create_keeps_given_identity`: an explicit id is kept
//! - `test_create_then_list`: created records are listed in order
//! - `test_update_merges_patch`: patched field changes, others kept
//! - `test_update_nonexistent`: update unknown id returns Err
//! - `test_delete_existing`: deleted record is no longer listed
//! - `test_delete_nonexistent`: delete unknown id (Ok or Err, both accepted)
//!
//! ## Bulk delete
//! - `test_delete_where_matches_case_insensitively`
//! - `test_delete_where_without_match`
//!
//! ## Edge Cases
//! - `test_concurrent_creates`: parallel creates from spawned tasks
//! - `test_store_over_source`: a `RecordStore` loads what the source holds

/// Generate a full `RecordSource` conformance test suite.
///
/// `$factory` must evaluate to an empty source implementing `RecordSource`,
/// keyed by `intern_id`. It is re-evaluated for each test to ensure isolation.
/// For the concurrent test the source must also be `Clone + 'static`.
#[macro_export]
macro_rules! record_source_tests {
    ($factory:expr) => {
        mod record_source_contract_tests {
            use super::*;
            use std::sync::Arc;
            use tabview::core::record::{Record, RecordSchema};
            use tabview::core::source::RecordSource;
            use tabview::core::store::RecordStore;

            // ==================================================================
            // CRUD: List & Create
            // ==================================================================

            #[tokio::test]
            async fn test_list_empty() {
                let source = $factory;

                let all = source.list().await.unwrap();
                assert!(all.is_empty(), "List on empty source should return empty vec");
            }

            #[tokio::test]
            async fn test_create_assigns_identity() {
                let source = $factory;

                let created = source.create(new_intern("Ana", "CVSU")).await.unwrap();
                assert!(created.id("intern_id").is_some(), "Created record needs an id");
                assert_field_string(&created, "intern_name", "Ana");
            }

            #[tokio::test]
            async fn test_create_keeps_given_identity() {
                let source = $factory;
                let record = new_intern("Ben", "UPLB").with("intern_id", "fixed-id");

                let created = source.create(record).await.unwrap();
                assert_eq!(created.id("intern_id"), Some("fixed-id".to_string()));
            }

            #[tokio::test]
            async fn test_create_then_list() {
                let source = $factory;
                for name in ["Ana", "Ben", "Carla"] {
                    source.create(new_intern(name, "CVSU")).await.unwrap();
                }

                let all = source.list().await.unwrap();
                assert_count(&all, 3);
                let names: Vec<&str> = all
                    .iter()
                    .filter_map(|v| v.get("intern_name").and_then(|n| n.as_str()))
                    .collect();
                assert_eq!(names, vec!["Ana", "Ben", "Carla"]);
            }

            // ==================================================================
            // CRUD: Update
            // ==================================================================

            #[tokio::test]
            async fn test_update_merges_patch() {
                let source = $factory;
                let created = source.create(new_intern("Ana", "CVSU")).await.unwrap();
                let id = created.id("intern_id").unwrap();

                let patch = Record::new().with("status", "Completed");
                let updated = source.update(&id, patch).await.unwrap();
                assert_field_string(&updated, "status", "Completed");
                assert_field_string(&updated, "intern_name", "Ana");

                let listed = source.list().await.unwrap();
                assert_eq!(listed[0]["status"], "Completed");
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let source = $factory;

                let result = source
                    .update("no-such-id", Record::new().with("status", "x"))
                    .await;
                assert!(result.is_err(), "Updating a nonexistent record should fail");
            }

            // ==================================================================
            // CRUD: Delete
            // ==================================================================

            #[tokio::test]
            async fn test_delete_existing() {
                let source = $factory;
                let a = source.create(new_intern("Ana", "CVSU")).await.unwrap();
                source.create(new_intern("Ben", "CVSU")).await.unwrap();

                source.delete(&a.id("intern_id").unwrap()).await.unwrap();

                let all = source.list().await.unwrap();
                assert_count(&all, 1);
                assert_eq!(all[0]["intern_name"], "Ben");
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let source = $factory;

                // Either outcome is acceptable; the call must not panic
                let _ = source.delete("no-such-id").await;
                assert!(source.list().await.unwrap().is_empty());
            }

            // ==================================================================
            // Bulk delete by facet
            // ==================================================================

            #[tokio::test]
            async fn test_delete_where_matches_case_insensitively() {
                let source = $factory;
                for (name, school) in [("Ana", "CVSU"), ("Ben", "cvsu"), ("Carla", "UPLB")] {
                    source
                        .create(new_intern(name, school).with("abbreviation", school))
                        .await
                        .unwrap();
                }

                let removed = source.delete_where("abbreviation", "CvSU").await.unwrap();
                assert_eq!(removed, 2);

                let all = source.list().await.unwrap();
                assert_count(&all, 1);
                assert_eq!(all[0]["abbreviation"], "UPLB");
            }

            #[tokio::test]
            async fn test_delete_where_without_match() {
                let source = $factory;
                source.create(new_intern("Ana", "CVSU")).await.unwrap();

                let removed = source.delete_where("abbreviation", "MIT").await.unwrap();
                assert_eq!(removed, 0);
                assert_count(&source.list().await.unwrap(), 1);
            }

            // ==================================================================
            // Edge Cases
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_creates() {
                let source = $factory;
                let s1 = source.clone();
                let s2 = source.clone();

                let h1 = tokio::spawn(async move { s1.create(new_intern("A", "CVSU")).await });
                let h2 = tokio::spawn(async move { s2.create(new_intern("B", "UPLB")).await });

                let a = h1.await.unwrap().unwrap();
                let b = h2.await.unwrap().unwrap();
                assert_ne!(a.id("intern_id"), b.id("intern_id"));
                assert_count(&source.list().await.unwrap(), 2);
            }

            #[tokio::test]
            async fn test_store_over_source() {
                let source = $factory;
                source.create(new_intern("Ana", "CVSU")).await.unwrap();
                source.create(new_intern("Ben", "UPLB")).await.unwrap();

                let store = RecordStore::new(Arc::new(source), "intern_id", RecordSchema::default());
                let report = store.load().await.unwrap();
                assert_eq!(report.accepted, 2);
                assert!(report.rejected.is_empty());

                let created = store.create(new_intern("Carla", "CVSU")).await.unwrap();
                assert_eq!(store.len(), 3);

                store.delete(&created.id("intern_id").unwrap()).await.unwrap();
                store.load().await.unwrap();
                assert_eq!(store.len(), 2);
            }
        }
    };
}
