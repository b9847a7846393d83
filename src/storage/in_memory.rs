//! In-memory implementation of RecordSource for testing and development

use crate::core::collate::same_text;
use crate::core::field::FieldValue;
use crate::core::record::Record;
use crate::core::source::RecordSource;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// How identities are assigned to created records that carry none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Random UUID v4 strings
    #[default]
    Uuid,
    /// Next integer after the largest numeric id held
    Sequence,
}

/// In-memory record source
///
/// Holds raw payload entries, so malformed entries can be seeded to exercise
/// schema validation. Failures and response latency can be injected.
#[derive(Clone)]
pub struct InMemoryRecordSource {
    id_field: Arc<str>,
    id_strategy: IdStrategy,
    entries: Arc<RwLock<Vec<Value>>>,
    failing: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
}

impl InMemoryRecordSource {
    /// Create an empty source keyed by `id_field`
    pub fn new(id_field: &str) -> Self {
        Self {
            id_field: Arc::from(id_field),
            id_strategy: IdStrategy::default(),
            entries: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
            latency_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Seed with raw payload entries
    pub fn with_payload(self, payload: Vec<Value>) -> Self {
        if let Ok(mut entries) = self.entries.write() {
            *entries = payload;
        }
        self
    }

    /// Seed with records
    pub fn with_records(self, records: Vec<Record>) -> Self {
        let payload = records
            .iter()
            .filter_map(|r| serde_json::to_value(r).ok())
            .collect();
        self.with_payload(payload)
    }

    /// Make every following call fail until switched back
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay applied to every following response
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Replace the whole backing collection
    pub fn replace(&self, payload: Vec<Value>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        *entries = payload;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn respond(&self, operation: &str) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            bail!("Injected failure during {}", operation);
        }
        Ok(())
    }

    fn next_id(&self, entries: &[Value]) -> FieldValue {
        match self.id_strategy {
            IdStrategy::Uuid => FieldValue::String(Uuid::new_v4().to_string()),
            IdStrategy::Sequence => {
                let max = entries
                    .iter()
                    .filter_map(|e| e.get(&*self.id_field).and_then(Value::as_i64))
                    .max()
                    .unwrap_or(0);
                FieldValue::Integer(max + 1)
            }
        }
    }
}

fn entry_id(entry: &Value, id_field: &str) -> Option<String> {
    match entry.get(id_field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn list(&self) -> Result<Vec<Value>> {
        let snapshot = self
            .entries
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?
            .clone();

        self.respond("list").await?;
        Ok(snapshot)
    }

    async fn create(&self, mut record: Record) -> Result<Record> {
        self.respond("create").await?;

        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match record.id(&self.id_field) {
            Some(id) => {
                if entries
                    .iter()
                    .any(|e| entry_id(e, &self.id_field).as_deref() == Some(id.as_str()))
                {
                    bail!("Record with id '{}' already exists", id);
                }
            }
            None => {
                let id = self.next_id(&entries);
                record.set(self.id_field.to_string(), id);
            }
        }

        entries.push(serde_json::to_value(&record)?);
        Ok(record)
    }

    async fn update(&self, id: &str, patch: Record) -> Result<Record> {
        self.respond("update").await?;

        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let entry = entries
            .iter_mut()
            .find(|e| entry_id(e, &self.id_field).as_deref() == Some(id))
            .ok_or_else(|| anyhow!("Record not found"))?;

        let mut record = Record::from_json(entry.clone())?;
        record.merge(&patch);
        *entry = serde_json::to_value(&record)?;

        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.respond("delete").await?;

        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let before = entries.len();
        entries.retain(|e| entry_id(e, &self.id_field).as_deref() != Some(id));
        if entries.len() == before {
            bail!("Record not found");
        }

        Ok(())
    }

    async fn delete_where(&self, field: &str, value: &str) -> Result<usize> {
        self.respond("delete").await?;

        let mut entries = self
            .entries
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let before = entries.len();
        entries.retain(|e| {
            e.get(field)
                .and_then(Value::as_str)
                .is_none_or(|v| !same_text(v, value))
        });

        Ok(before - entries.len())
    }
}
