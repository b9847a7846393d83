//! Record source implementations for different backends

#[cfg(feature = "http")]
pub mod http;
pub mod in_memory;

#[cfg(feature = "http")]
pub use http::{HttpEndpoints, HttpRecordSource};
pub use in_memory::{IdStrategy, InMemoryRecordSource};
