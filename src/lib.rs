//! # tabview
//!
//! A controller for record tables fed by a REST backend: it holds the fetched
//! collection and derives what the user sees from it.
//!
//! ## Features
//!
//! - **Filtering**: free-text search over displayed values, a categorical facet
//!   with an "All" sentinel, and a calendar-day date filter in local time
//! - **Sorting**: stable, non-mutating, by text, number, duration, date or time
//! - **Pagination**: page slicing, clamping and the page-number window
//! - **Export**: CSV, tab-separated spreadsheet and printable HTML of the full
//!   filtered collection
//! - **Record Store**: async load and mutations against a [`RecordSource`],
//!   stale responses discarded, failed mutations leave the store untouched
//! - **Configuration-Based**: each page is a [`ViewConfig`] in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabview::prelude::*;
//!
//! let config = ViewConfig::history();
//! let source = Arc::new(InMemoryRecordSource::new(&config.id_field));
//! let store = RecordStore::new(source, &config.id_field, config.schema.clone());
//! store.load().await?;
//!
//! let mut view = TableView::new(config);
//! view.set_facet(Some("CVSU".to_string()));
//!
//! let records = store.records();
//! let page = view.page(&records);
//! println!("{}", page.summary()); // Showing 1 to 10 of 42 entries
//!
//! let csv = view.export(&records, ExportFormat::Csv)?;
//! ```
//!
//! [`RecordSource`]: crate::core::source::RecordSource
//! [`ViewConfig`]: crate::config::ViewConfig

pub mod config;
pub mod core;
pub mod storage;

/// Install a formatting subscriber filtered by `RUST_LOG`, or `default_directive` when unset
///
/// Does nothing when a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Record Model ===
    pub use crate::core::{
        field::{FieldKind, FieldValue},
        record::{FieldSpec, Record, RecordSchema},
    };

    // === Pipeline ===
    pub use crate::core::{
        export::{DirectoryTarget, ExportFormat, ExportJob, ExportPayload, ExportTarget},
        filter::{DateFilter, FACET_ALL, FilterState},
        paginate::{Page, PageControl, PageState},
        sort::{SortDirection, SortKey},
        view::TableView,
    };

    // === Store ===
    pub use crate::core::{
        source::RecordSource,
        store::{LoadReport, LoadState, RecordStore},
    };

    // === UI State ===
    pub use crate::core::{
        debounce::{DebounceInput, Debouncer},
        menu::{ClickTarget, ListenerRegistry, MenuState},
    };

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, ExportError, StoreError, TabviewError, ValidationError,
    };

    // === Storage ===
    pub use crate::storage::{IdStrategy, InMemoryRecordSource};
    #[cfg(feature = "http")]
    pub use crate::storage::{HttpEndpoints, HttpRecordSource};

    // === Config ===
    pub use crate::config::{ColumnConfig, ExportConfig, ViewConfig, ViewsConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::NaiveDate;
    pub use serde_json::{Value, json};
}
