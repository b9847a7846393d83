//! Records and the schema that admits them into a store

use crate::core::error::ValidationError;
use crate::core::field::{FieldFormat, FieldKind, FieldValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of domain data: an ordered mapping of field names to primitive values
///
/// Field order follows the payload the record came from. The controller is
/// generic over record shape; views pick the fields they care about by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, FieldValue>);

impl Record {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style field insertion
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Remove a field, keeping the order of the remaining ones
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.shift_remove(field)
    }

    /// The field as text, `None` when it is absent, null or blank
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field)
            .filter(|v| !v.is_blank())
            .map(|v| v.to_string())
    }

    /// Identity of the record under the given id field
    pub fn id(&self, id_field: &str) -> Option<String> {
        match self.get(id_field)? {
            FieldValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }

    /// Overwrite fields with those of `patch`, keeping field order for existing keys
    pub fn merge(&mut self, patch: &Record) {
        for (field, value) in patch.fields() {
            self.0.insert(field.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert one entry of a source payload into a record
    ///
    /// Only flat objects of primitive values are accepted. Nested arrays or
    /// objects are rejected instead of being flattened or stringified.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ValidationError::NotAnObject {
                    message: format!("expected object, got {}", json_type_name(&other)),
                });
            }
        };

        let mut record = Record::new();
        for (field, value) in map {
            let field_value = match value {
                Value::Null => FieldValue::Null,
                Value::Bool(b) => FieldValue::Boolean(b),
                Value::String(s) => FieldValue::String(s),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => FieldValue::Integer(i),
                    None => FieldValue::Float(n.as_f64().unwrap_or_default()),
                },
                nested => {
                    return Err(ValidationError::NotAnObject {
                        message: format!(
                            "field '{}' holds a nested {}",
                            field,
                            json_type_name(&nested)
                        ),
                    });
                }
            };
            record.0.insert(field, field_value);
        }
        Ok(record)
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared shape of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    #[serde(default)]
    pub kind: FieldKind,

    /// Absent, null or blank values are rejected when set
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Explicit schema for records entering the store
///
/// Fields not named by the schema pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a record against the schema, reporting the first violation
    pub fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        self.validate_except(record, None)
    }

    /// Validate a record before the source has assigned its identity
    ///
    /// `skip` names a field left out of the required check. A value present
    /// under that name must still be well formed.
    pub fn validate_except(
        &self,
        record: &Record,
        skip: Option<&str>,
    ) -> Result<(), ValidationError> {
        for spec in &self.fields {
            let required = spec.required && skip != Some(spec.name.as_str());
            match record.get(&spec.name) {
                None => {
                    if required {
                        return Err(ValidationError::MissingField {
                            field: spec.name.clone(),
                        });
                    }
                }
                Some(value) => {
                    if required && value.is_blank() {
                        return Err(ValidationError::MissingField {
                            field: spec.name.clone(),
                        });
                    }
                    let valid = FieldFormat::for_kind(spec.kind)
                        .is_none_or(|format| format.validate(value));
                    if !valid {
                        return Err(ValidationError::MalformedField {
                            field: spec.name.clone(),
                            value: value.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Convert and validate a payload, splitting accepted records from rejected entries
    ///
    /// Rejected entries are reported with their position in the payload.
    pub fn admit(&self, payload: Vec<Value>) -> (Vec<Record>, Vec<(usize, ValidationError)>) {
        let mut accepted = Vec::with_capacity(payload.len());
        let mut rejected = Vec::new();

        for (index, entry) in payload.into_iter().enumerate() {
            match Record::from_json(entry).and_then(|r| self.validate(&r).map(|_| r)) {
                Ok(record) => accepted.push(record),
                Err(e) => rejected.push((index, e)),
            }
        }

        (accepted, rejected)
    }
}
