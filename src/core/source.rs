//! Record source trait: the remote collection a store is loaded from and mutated against

use crate::core::record::Record;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Service trait for the backend owning a record collection
///
/// The store is agnostic to where records live. `list` returns raw payload
/// entries so the store can validate them against its schema before they
/// enter the canonical collection.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the whole collection
    async fn list(&self) -> Result<Vec<Value>>;

    /// Create a record, returning it as stored (with its assigned identity)
    async fn create(&self, record: Record) -> Result<Record>;

    /// Apply a partial update to the record with this id
    async fn update(&self, id: &str, patch: Record) -> Result<Record>;

    /// Delete the record with this id
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete every record whose `field` equals `value` case-insensitively
    ///
    /// Returns the number of records removed.
    async fn delete_where(&self, field: &str, value: &str) -> Result<usize>;
}
