//! Typed error handling for tabview
//!
//! The filter/sort/paginate pipeline is total and never fails. Errors only
//! come from the edges: loading or mutating the record store, building an
//! export, and reading view configuration.
//!
//! # Error Categories
//!
//! - [`StoreError`]: record source failures and unknown records
//! - [`ExportError`]: malformed export jobs
//! - [`ConfigError`]: configuration parsing and validation
//! - [`ValidationError`]: records rejected at the store boundary
//!
//! # Example
//!
//! ```rust,ignore
//! match store.delete(&id).await {
//!     Ok(()) => { view.refresh(&store.records()); }
//!     Err(TabviewError::Store(StoreError::NotFound { id })) => {
//!         tracing::warn!(%id, "record already gone");
//!     }
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use thiserror::Error;

/// The main error type for tabview
#[derive(Debug, Error)]
pub enum TabviewError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl TabviewError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            TabviewError::Store(e) => e.error_code(),
            TabviewError::Export(e) => e.error_code(),
            TabviewError::Config(_) => "CONFIG_ERROR",
            TabviewError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Whether retrying the same action later could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TabviewError::Store(StoreError::LoadFailed { .. })
                | TabviewError::Store(StoreError::MutationFailed { .. })
        )
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised while loading or mutating the record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record source could not deliver the collection
    #[error("Failed to load records: {message}")]
    LoadFailed { message: String },

    /// The record source rejected a create/update/delete
    #[error("Failed to {operation} record: {message}")]
    MutationFailed { operation: String, message: String },

    /// No record with this id is held by the store
    #[error("Record with id '{id}' not found")]
    NotFound { id: String },

    /// A record lacks the identity field configured for the store
    #[error("Record has no '{field}' identity field")]
    MissingId { field: String },
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::LoadFailed { .. } => "STORE_LOAD_FAILED",
            StoreError::MutationFailed { .. } => "STORE_MUTATION_FAILED",
            StoreError::NotFound { .. } => "RECORD_NOT_FOUND",
            StoreError::MissingId { .. } => "RECORD_MISSING_ID",
        }
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors raised while building an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// A row does not have one cell per header
    #[error("Row {row} has {actual} cells but there are {expected} headers")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The export has no header columns
    #[error("Export has no columns")]
    NoColumns,

    /// Cells could not be written or read as delimited text
    #[error("Failed to encode export: {message}")]
    EncodingFailed { message: String },

    /// The host could not open a download or print surface
    #[error("Export target unavailable: {message}")]
    TargetUnavailable { message: String },
}

impl ExportError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ExportError::RowWidthMismatch { .. } => "EXPORT_ROW_WIDTH_MISMATCH",
            ExportError::NoColumns => "EXPORT_NO_COLUMNS",
            ExportError::EncodingFailed { .. } => "EXPORT_ENCODING_FAILED",
            ExportError::TargetUnavailable { .. } => "EXPORT_TARGET_UNAVAILABLE",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to view configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// A setting references a field that no column declares
    #[error("Unknown field '{field}' referenced by {context}")]
    UnknownField { field: String, context: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A record rejected at the store boundary
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A required field is absent, null or blank
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    /// A field value does not fit its declared kind
    #[error("Field '{field}' has malformed value '{value}'")]
    MalformedField { field: String, value: String },

    /// The payload entry is not a flat object of primitive values
    #[error("Record is not a flat object: {message}")]
    NotAnObject { message: String },
}
