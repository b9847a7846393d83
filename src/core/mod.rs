//! Core module containing the record model and the filter/sort/paginate/export pipeline

pub mod collate;
pub mod debounce;
pub mod error;
pub mod export;
pub mod field;
pub mod filter;
pub mod format;
pub mod menu;
pub mod paginate;
pub mod record;
pub mod sort;
pub mod source;
pub mod store;
pub mod view;

pub use debounce::{DebounceInput, Debouncer};
pub use error::{ConfigError, ExportError, StoreError, TabviewError, ValidationError};
pub use export::{ExportFormat, ExportJob, ExportPayload, ExportTarget};
pub use field::{FieldFormat, FieldKind, FieldValue};
pub use filter::{DateFilter, FilterSpec, FilterState};
pub use menu::{ListenerRegistry, MenuState};
pub use paginate::{Page, PageControl, PageState, PaginationMeta};
pub use record::{FieldSpec, Record, RecordSchema};
pub use sort::{SortDirection, SortKey, SortState};
pub use source::RecordSource;
pub use store::{LoadReport, LoadState, RecordStore};
pub use view::TableView;
