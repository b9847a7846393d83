//! Record store owning the canonical collection behind a view
//!
//! The store is the only writer of the collection. Views derive what they show
//! from [`RecordStore::records`] and never mutate it. Mutations are applied
//! locally only after the [`RecordSource`] confirms them, so a failed request
//! leaves the collection exactly as it was.
//!
//! Loads are tagged with a generation number. When a newer load has been
//! started by the time a response arrives, the older response is discarded
//! instead of overwriting fresher data.

use crate::core::collate::same_text;
use crate::core::error::{StoreError, TabviewError, ValidationError};
use crate::core::record::{Record, RecordSchema};
use crate::core::source::RecordSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Loading status of the collection, shown as a loading or error state by views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed {
        message: String,
    },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Outcome of one [`RecordStore::load`] call
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub generation: u64,

    /// Records admitted into the store
    pub accepted: usize,

    /// Payload entries refused by the schema, with their payload position
    pub rejected: Vec<(usize, ValidationError)>,

    /// A newer load was started first; this response was dropped
    pub stale: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<Record>,
    load_state: LoadState,
    revision: u64,
}

impl StoreState {
    fn position(&self, id_field: &str, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.id(id_field).as_deref() == Some(id))
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

/// Canonical record collection kept in sync with a [`RecordSource`]
///
/// Cloning is cheap and clones share the same collection.
#[derive(Clone)]
pub struct RecordStore {
    source: Arc<dyn RecordSource>,
    schema: Arc<RecordSchema>,
    id_field: Arc<str>,
    state: Arc<RwLock<StoreState>>,
    generation: Arc<AtomicU64>,
}

impl RecordStore {
    pub fn new(
        source: Arc<dyn RecordSource>,
        id_field: impl Into<String>,
        schema: RecordSchema,
    ) -> Self {
        let id_field: String = id_field.into();
        Self {
            source,
            schema: Arc::new(schema),
            id_field: Arc::from(id_field),
            state: Arc::new(RwLock::new(StoreState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Snapshot of the collection
    pub fn records(&self) -> Vec<Record> {
        self.read_state().records.clone()
    }

    /// Run `f` against the collection without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&[Record]) -> R) -> R {
        f(&self.read_state().records)
    }

    pub fn len(&self) -> usize {
        self.read_state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        let state = self.read_state();
        state
            .position(&self.id_field, id)
            .map(|pos| state.records[pos].clone())
    }

    pub fn load_state(&self) -> LoadState {
        self.read_state().load_state.clone()
    }

    /// Incremented on every change to the collection
    pub fn revision(&self) -> u64 {
        self.read_state().revision
    }

    /// Replace the collection with the source's current contents
    ///
    /// Entries failing the schema are left out and listed in the report. On
    /// failure the previous collection is kept and the load state records the
    /// error.
    pub async fn load(&self) -> Result<LoadReport, TabviewError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.write_state().load_state = LoadState::Loading;
        tracing::debug!(generation, "Loading records");

        let result = self.source.list().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Discarding stale load response");
            return Ok(LoadReport {
                generation,
                accepted: 0,
                rejected: Vec::new(),
                stale: true,
            });
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(generation, error = %message, "Failed to load records");
                self.write_state().load_state = LoadState::Failed {
                    message: message.clone(),
                };
                return Err(StoreError::LoadFailed { message }.into());
            }
        };

        let (records, rejected) = self.schema.admit(payload);
        for (index, error) in &rejected {
            tracing::warn!(index, %error, "Rejected malformed record");
        }

        let accepted = records.len();
        {
            let mut state = self.write_state();
            state.records = records;
            state.load_state = LoadState::Loaded;
            state.touch();
        }
        tracing::debug!(generation, count = accepted, rejected = rejected.len(), "Loaded records");

        Ok(LoadReport {
            generation,
            accepted,
            rejected,
            stale: false,
        })
    }

    /// Create a record through the source and append the stored version
    ///
    /// The outgoing record may omit the identity field; the source assigns it.
    pub async fn create(&self, record: Record) -> Result<Record, TabviewError> {
        self.schema
            .validate_except(&record, Some(&*self.id_field))?;

        let created = self
            .source
            .create(record)
            .await
            .map_err(|e| mutation_failed("create", e))?;

        let id = created
            .id(&self.id_field)
            .ok_or_else(|| StoreError::MissingId {
                field: self.id_field.to_string(),
            })?;
        self.schema.validate(&created)?;

        {
            let mut state = self.write_state();
            state.records.push(created.clone());
            state.touch();
        }
        tracing::debug!(%id, "Created record");

        Ok(created)
    }

    /// Merge `patch` into the record with this id once the source accepts it
    ///
    /// The identity field cannot be changed through a patch and is ignored.
    pub async fn update(&self, id: &str, mut patch: Record) -> Result<Record, TabviewError> {
        patch.remove(&self.id_field);

        let mut merged = self.get(id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;
        merged.merge(&patch);
        self.schema.validate(&merged)?;

        let fields = patch.len();
        let mut stored = self
            .source
            .update(id, patch)
            .await
            .map_err(|e| mutation_failed("update", e))?;
        stored.remove(&self.id_field);
        merged.merge(&stored);
        self.schema.validate(&merged)?;

        let updated = {
            let mut state = self.write_state();
            let pos = state
                .position(&self.id_field, id)
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
            state.records[pos] = merged;
            state.touch();
            state.records[pos].clone()
        };
        tracing::debug!(%id, fields, "Updated record");

        Ok(updated)
    }

    /// Delete the record with this id through the source, then locally
    pub async fn delete(&self, id: &str) -> Result<(), TabviewError> {
        if self.get(id).is_none() {
            return Err(StoreError::NotFound { id: id.to_string() }.into());
        }

        self.source
            .delete(id)
            .await
            .map_err(|e| mutation_failed("delete", e))?;

        {
            let mut state = self.write_state();
            let id_field = &self.id_field;
            state
                .records
                .retain(|r| r.id(id_field).as_deref() != Some(id));
            state.touch();
        }
        tracing::debug!(%id, "Deleted record");

        Ok(())
    }

    /// Delete every record whose `field` equals `value` case-insensitively
    ///
    /// Returns how many records left the local collection.
    pub async fn delete_where(&self, field: &str, value: &str) -> Result<usize, TabviewError> {
        let remote = self
            .source
            .delete_where(field, value)
            .await
            .map_err(|e| mutation_failed("delete", e))?;

        let removed = {
            let mut state = self.write_state();
            let before = state.records.len();
            state
                .records
                .retain(|r| r.text(field).is_none_or(|v| !same_text(&v, value)));
            let removed = before - state.records.len();
            if removed > 0 {
                state.touch();
            }
            removed
        };
        tracing::debug!(field, value, removed, remote, "Deleted matching records");

        Ok(removed)
    }
}

fn mutation_failed(operation: &str, error: anyhow::Error) -> TabviewError {
    tracing::warn!(operation, error = %error, "Record source rejected mutation");
    StoreError::MutationFailed {
        operation: operation.to_string(),
        message: error.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldKind;
    use crate::core::record::FieldSpec;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    /// Source returning a fixed payload and refusing every mutation
    struct ReadOnlySource {
        payload: Vec<Value>,
    }

    #[async_trait]
    impl RecordSource for ReadOnlySource {
        async fn list(&self) -> Result<Vec<Value>> {
            Ok(self.payload.clone())
        }

        async fn create(&self, _record: Record) -> Result<Record> {
            Err(anyhow!("read-only"))
        }

        async fn update(&self, _id: &str, _patch: Record) -> Result<Record> {
            Err(anyhow!("read-only"))
        }

        async fn delete(&self, _id: &str) -> Result<()> {
            Err(anyhow!("read-only"))
        }

        async fn delete_where(&self, _field: &str, _value: &str) -> Result<usize> {
            Err(anyhow!("read-only"))
        }
    }

    /// Source that trims remarks and stamps who edited the record
    struct NormalizingSource;

    #[async_trait]
    impl RecordSource for NormalizingSource {
        async fn list(&self) -> Result<Vec<Value>> {
            Ok(vec![json!({"id": "a", "remarks": "draft"})])
        }

        async fn create(&self, record: Record) -> Result<Record> {
            Ok(record.with("id", "assigned"))
        }

        async fn update(&self, id: &str, mut patch: Record) -> Result<Record> {
            if let Some(remarks) = patch.text("remarks") {
                patch.set("remarks", remarks.trim().to_string());
            }
            Ok(patch.with("id", id).with("updated_by", "registrar"))
        }

        async fn delete(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn delete_where(&self, _field: &str, _value: &str) -> Result<usize> {
            Ok(0)
        }
    }

    fn store(payload: Vec<Value>) -> RecordStore {
        let schema = RecordSchema::new(vec![
            FieldSpec::new("id", FieldKind::Text).required(),
            FieldSpec::new("hours", FieldKind::Duration),
        ]);
        RecordStore::new(Arc::new(ReadOnlySource { payload }), "id", schema)
    }

    #[tokio::test]
    async fn test_load_reports_rejected_entries() {
        let store = store(vec![
            json!({"id": "a", "hours": 3600}),
            json!({"hours": 10}),
            json!({"id": "c", "hours": "forever"}),
        ]);

        let report = store.load().await.unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(!report.stale);
        assert_eq!(store.len(), 1);
        assert_eq!(store.load_state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_failed_mutations_leave_store_unchanged() {
        let store = store(vec![json!({"id": "a"}), json!({"id": "b"})]);
        store.load().await.unwrap();
        let before = store.records();
        let revision = store.revision();

        let err = store.delete("a").await.unwrap_err();
        assert_eq!(err.error_code(), "STORE_MUTATION_FAILED");
        assert!(err.is_recoverable());

        let patch = Record::new().with("hours", 60_i64);
        assert!(store.update("b", patch).await.is_err());
        assert!(store.create(Record::new().with("id", "z")).await.is_err());
        assert!(store.delete_where("id", "a").await.is_err());

        assert_eq!(store.records(), before);
        assert_eq!(store.revision(), revision);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = store(vec![json!({"id": "a"})]);
        store.load().await.unwrap();

        let err = store.delete("missing").await.unwrap_err();
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_patch_is_rejected_before_source() {
        let store = store(vec![json!({"id": "a"})]);
        store.load().await.unwrap();

        let err = store
            .update("a", Record::new().with("hours", "lots"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_keeps_what_the_source_stored() {
        let schema = RecordSchema::new(vec![FieldSpec::new("id", FieldKind::Text).required()]);
        let store = RecordStore::new(Arc::new(NormalizingSource), "id", schema);
        store.load().await.unwrap();

        let updated = store
            .update("a", Record::new().with("remarks", "  late  "))
            .await
            .unwrap();
        assert_eq!(updated.text("remarks").as_deref(), Some("late"));
        assert_eq!(updated.text("updated_by").as_deref(), Some("registrar"));
        assert_eq!(store.get("a"), Some(updated));
    }

    #[tokio::test]
    async fn test_create_leaves_identity_to_the_source() {
        let schema = RecordSchema::new(vec![
            FieldSpec::new("id", FieldKind::Text).required(),
            FieldSpec::new("name", FieldKind::Text).required(),
        ]);
        let store = RecordStore::new(Arc::new(NormalizingSource), "id", schema);

        let created = store.create(Record::new().with("name", "Ana")).await.unwrap();
        assert_eq!(created.id("id").as_deref(), Some("assigned"));

        let err = store.create(Record::new().with("id", "x")).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
