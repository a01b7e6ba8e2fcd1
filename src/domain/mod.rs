//! Domain models and types for Quarry.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Error types** ([`QuarryError`], [`SinkError`]) and the [`Result`] alias
//! - **Raw values** ([`FieldValue`], [`Timestamp`]) read off source records
//! - **Rows** ([`ProcessedRow`], [`RowError`]) exchanged with the sink
//! - **Sink schema** ([`SchemaInfo`], [`ColumnSchema`], [`FieldType`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, QuarryError>`]:
//!
//! ```rust
//! use quarry::domain::{Result, Timestamp};
//!
//! fn example() -> Result<()> {
//!     let pull_date = Timestamp::parse("2023-01-15")?;
//!     assert_eq!(pull_date.utc_naive().to_string(), "2023-01-15 00:00:00");
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod errors;
pub mod result;
pub mod row;
pub mod schema;
pub mod value;

// Re-export commonly used types for convenience
pub use errors::{QuarryError, SinkError};
pub use result::Result;
pub use row::{ProcessedRow, RowError, RowErrorDetail};
pub use schema::{ColumnSchema, FieldType, SchemaInfo};
pub use value::{FieldValue, Timestamp};
