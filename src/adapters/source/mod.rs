//! Record source layer
//!
//! Trait-based abstraction over upstream data, with an in-memory and a
//! JSON lines implementation.

pub mod jsonl;
pub mod memory;
pub mod traits;

pub use jsonl::{JsonLinesSource, JsonRecord};
pub use memory::MemorySource;
pub use traits::{Record, RecordSource};
