//! Sink abstraction layer
//!
//! Trait-based abstraction over the downstream analytical store.

pub mod traits;

pub use traits::{QueryResult, SinkClient, TableHandle};
