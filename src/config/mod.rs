//! Configuration loading and management
//!
//! Each concrete page (attendance, interns, history) is one [`ViewConfig`]:
//! its columns, which fields search, facet and date filters read, the offered
//! sort keys, page size and export metadata. Views are declared in YAML or
//! taken from the built-in presets.

use crate::core::debounce::DEFAULT_DEBOUNCE;
use crate::core::error::ConfigError;
use crate::core::field::FieldKind;
use crate::core::filter::{FilterSpec, SearchField};
use crate::core::paginate::DEFAULT_MAX_PAGES_TO_SHOW;
use crate::core::record::{FieldSpec, RecordSchema};
use crate::core::sort::SortKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

fn default_page_size() -> usize {
    10
}

fn default_max_pages_to_show() -> usize {
    DEFAULT_MAX_PAGES_TO_SHOW
}

fn default_search_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

/// One displayed and exported column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Header label (e.g., "Total Hours")
    pub label: String,

    /// Record field rendered in the column
    pub field: String,

    #[serde(default)]
    pub kind: FieldKind,
}

impl ColumnConfig {
    pub fn new(label: impl Into<String>, field: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            kind,
        }
    }
}

/// Export metadata for a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name without extension
    pub filename: String,

    /// Heading of the printable document
    pub title: String,

    /// Header of a 1-based row number column prepended to exports
    #[serde(default)]
    pub row_number_header: Option<String>,
}

/// Declarative configuration of one tabular view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Unique view name (e.g., "attendance")
    pub name: String,

    /// Field carrying record identity
    pub id_field: String,

    pub columns: Vec<ColumnConfig>,

    /// Fields matched by the free-text search
    #[serde(default)]
    pub search_fields: Vec<String>,

    /// Categorical filter field
    #[serde(default)]
    pub facet_field: Option<String>,

    /// Field compared by the calendar-day filter
    #[serde(default)]
    pub date_field: Option<String>,

    #[serde(default)]
    pub sort_keys: Vec<SortKey>,

    /// Label of the sort key selected when the view mounts
    #[serde(default)]
    pub default_sort: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_max_pages_to_show")]
    pub max_pages_to_show: usize,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    pub export: ExportConfig,

    /// Boundary schema for records entering the store
    #[serde(default)]
    pub schema: RecordSchema,
}

impl ViewConfig {
    /// Load a single view from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        parse_yaml(&content, Some(path))
    }

    /// Load a single view from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        parse_yaml(yaml, None)
    }

    /// Kind of a field, taken from its column, then the schema, else text
    pub fn field_kind(&self, field: &str) -> FieldKind {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.kind)
            .or_else(|| self.schema.field(field).map(|f| f.kind))
            .unwrap_or_default()
    }

    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            search_fields: self
                .search_fields
                .iter()
                .map(|name| SearchField::new(name.clone(), self.field_kind(name)))
                .collect(),
            facet_field: self.facet_field.clone(),
            date_field: self.date_field.clone(),
        }
    }

    /// Quiet period before a typed search term is applied
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn sort_key(&self, label: &str) -> Option<&SortKey> {
        self.sort_keys.iter().find(|k| k.label == label)
    }

    fn known_fields(&self) -> HashSet<&str> {
        self.columns
            .iter()
            .map(|c| c.field.as_str())
            .chain(self.schema.fields.iter().map(|f| f.name.as_str()))
            .chain(std::iter::once(self.id_field.as_str()))
            .collect()
    }

    /// Check that the view is usable
    ///
    /// Rejects a zero page size, an empty or duplicate-labelled column list,
    /// and filters or sort keys naming fields the view does not declare.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.columns", self.name),
                value: "[]".to_string(),
                message: "a view needs at least one column".to_string(),
            });
        }

        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.page_size", self.name),
                value: "0".to_string(),
                message: "page size must be positive".to_string(),
            });
        }

        let mut labels = HashSet::new();
        for column in &self.columns {
            if !labels.insert(column.label.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.columns", self.name),
                    value: column.label.clone(),
                    message: "duplicate column label".to_string(),
                });
            }
        }

        let known = self.known_fields();
        let referenced = self
            .search_fields
            .iter()
            .map(|f| (f.as_str(), "search_fields"))
            .chain(self.facet_field.iter().map(|f| (f.as_str(), "facet_field")))
            .chain(self.date_field.iter().map(|f| (f.as_str(), "date_field")))
            .chain(self.sort_keys.iter().map(|k| (k.field.as_str(), "sort_keys")));

        for (field, context) in referenced {
            if !known.contains(field) {
                return Err(ConfigError::UnknownField {
                    field: field.to_string(),
                    context: format!("{}.{}", self.name, context),
                });
            }
        }

        if let Some(label) = &self.default_sort
            && self.sort_key(label).is_none()
        {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.default_sort", self.name),
                value: label.clone(),
                message: "no sort key has this label".to_string(),
            });
        }

        Ok(())
    }

    /// Daily attendance log
    pub fn attendance() -> Self {
        Self {
            name: "attendance".to_string(),
            id_field: "attendance_id".to_string(),
            columns: vec![
                ColumnConfig::new("Name", "intern_name", FieldKind::Text),
                ColumnConfig::new("University", "school_name", FieldKind::Text),
                ColumnConfig::new("Date", "attendance_date", FieldKind::Date),
                ColumnConfig::new("Time In", "time_in", FieldKind::Time),
                ColumnConfig::new("Time Out", "time_out", FieldKind::Time),
                ColumnConfig::new("Total Hours", "total_hours", FieldKind::Duration),
                ColumnConfig::new("Status", "check_in", FieldKind::Text),
                ColumnConfig::new("Remarks", "remarks", FieldKind::Text),
            ],
            search_fields: vec![
                "intern_name".to_string(),
                "check_in".to_string(),
                "attendance_date".to_string(),
            ],
            facet_field: None,
            date_field: Some("attendance_date".to_string()),
            sort_keys: vec![
                SortKey::new("Name", "intern_name", FieldKind::Text),
                SortKey::new("Date", "attendance_date", FieldKind::Date).descending(),
                SortKey::new("Total Hours", "total_hours", FieldKind::Duration),
            ],
            default_sort: None,
            page_size: 5,
            max_pages_to_show: DEFAULT_MAX_PAGES_TO_SHOW,
            search_debounce_ms: default_search_debounce_ms(),
            export: ExportConfig {
                filename: "attendance_report".to_string(),
                title: "Attendance Report".to_string(),
                row_number_header: Some("ID".to_string()),
            },
            schema: RecordSchema::new(vec![
                FieldSpec::new("attendance_id", FieldKind::Number).required(),
                FieldSpec::new("intern_id", FieldKind::Text),
                FieldSpec::new("attendance_date", FieldKind::Date).required(),
                FieldSpec::new("time_in", FieldKind::Time),
                FieldSpec::new("time_out", FieldKind::Time),
                FieldSpec::new("total_hours", FieldKind::Duration),
            ]),
        }
    }

    /// Registered interns
    pub fn interns() -> Self {
        Self {
            name: "interns".to_string(),
            id_field: "intern_id".to_string(),
            columns: vec![
                ColumnConfig::new("Name", "intern_name", FieldKind::Text),
                ColumnConfig::new("School", "school_name", FieldKind::Text),
                ColumnConfig::new("Shift Schedule", "shift_name", FieldKind::Text),
                ColumnConfig::new("Total Hours", "total_hours", FieldKind::Duration),
                ColumnConfig::new("Status", "status", FieldKind::Text),
            ],
            search_fields: vec![
                "intern_name".to_string(),
                "school_name".to_string(),
                "status".to_string(),
            ],
            facet_field: Some("school_name".to_string()),
            date_field: None,
            sort_keys: vec![
                SortKey::new("Name", "intern_name", FieldKind::Text),
                SortKey::new("School", "school_name", FieldKind::Text),
                SortKey::new("Total Hours", "total_hours", FieldKind::Duration).descending(),
            ],
            default_sort: Some("Name".to_string()),
            page_size: default_page_size(),
            max_pages_to_show: DEFAULT_MAX_PAGES_TO_SHOW,
            search_debounce_ms: default_search_debounce_ms(),
            export: ExportConfig {
                filename: "intern_list".to_string(),
                title: "Intern List".to_string(),
                row_number_header: Some("ID".to_string()),
            },
            schema: RecordSchema::new(vec![
                FieldSpec::new("intern_id", FieldKind::Text).required(),
                FieldSpec::new("intern_name", FieldKind::Text).required(),
                FieldSpec::new("total_hours", FieldKind::Duration),
            ]),
        }
    }

    /// Interns who completed their hours, grouped by school abbreviation
    pub fn history() -> Self {
        Self {
            name: "history".to_string(),
            id_field: "intern_id".to_string(),
            columns: vec![
                ColumnConfig::new("Name", "intern_name", FieldKind::Text),
                ColumnConfig::new("University", "abbreviation", FieldKind::Text),
                ColumnConfig::new("Shift Schedule", "shift_name", FieldKind::Text),
                ColumnConfig::new("Completed Hours", "total_hours", FieldKind::Duration),
                ColumnConfig::new("Status", "status", FieldKind::Text),
            ],
            search_fields: vec![
                "intern_name".to_string(),
                "remarks".to_string(),
                "abbreviation".to_string(),
            ],
            facet_field: Some("abbreviation".to_string()),
            date_field: None,
            sort_keys: vec![
                SortKey::new("University", "abbreviation", FieldKind::Text),
                SortKey::new("Name", "intern_name", FieldKind::Text),
                SortKey::new("Completed Hours", "total_hours", FieldKind::Duration)
                    .descending(),
            ],
            default_sort: Some("University".to_string()),
            page_size: default_page_size(),
            max_pages_to_show: DEFAULT_MAX_PAGES_TO_SHOW,
            search_debounce_ms: default_search_debounce_ms(),
            export: ExportConfig {
                filename: "intern_history".to_string(),
                title: "Intern History Report".to_string(),
                row_number_header: Some("ID".to_string()),
            },
            schema: RecordSchema::new(vec![
                FieldSpec::new("intern_id", FieldKind::Text).required(),
                FieldSpec::new("intern_name", FieldKind::Text).required(),
                FieldSpec::new("abbreviation", FieldKind::Text),
                FieldSpec::new("remarks", FieldKind::Text),
                FieldSpec::new("total_hours", FieldKind::Duration),
            ]),
        }
    }
}

/// A bundle of views, typically one file per application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewsConfig {
    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

impl ViewsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        parse_yaml(&content, Some(path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        parse_yaml(yaml, None)
    }

    /// The three dashboard pages
    pub fn default_config() -> Self {
        Self {
            views: vec![
                ViewConfig::attendance(),
                ViewConfig::interns(),
                ViewConfig::history(),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&ViewConfig> {
        self.views.iter().find(|v| v.name == name)
    }

    /// Merge several bundles into one
    ///
    /// A later view replaces an earlier one with the same name in place;
    /// new names are appended in order of appearance.
    pub fn merge(configs: Vec<ViewsConfig>) -> Self {
        let mut merged = ViewsConfig::default();

        for view in configs.into_iter().flat_map(|c| c.views) {
            match merged.views.iter_mut().find(|v| v.name == view.name) {
                Some(existing) => {
                    tracing::debug!(view = %view.name, "Overriding view configuration");
                    *existing = view;
                }
                None => merged.views.push(view),
            }
        }

        merged
    }

    /// Validate every view
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for view in &self.views {
            if !names.insert(view.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "views".to_string(),
                    value: view.name.clone(),
                    message: "duplicate view name".to_string(),
                });
            }
            view.validate()?;
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        message: format!("{}: {}", path.display(), e),
    })
}

fn parse_yaml<T: serde::de::DeserializeOwned>(
    yaml: &str,
    path: Option<&Path>,
) -> Result<T, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
        file: path.map(|p| p.display().to_string()),
        message: e.to_string(),
    })
}
