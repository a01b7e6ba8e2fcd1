//! Core business logic for Quarry.
//!
//! # Modules
//!
//! - [`export`] - Job definition, batching, validation and orchestration
//! - [`transform`] - Field resolution and value sanitization
//!
//! # Export Workflow
//!
//! 1. **Validate**: Check declared fields against the source and the sink table
//! 2. **Batch**: Cut the record source into contiguous windows
//! 3. **Transform**: Resolve and sanitize every field of every record
//! 4. **Push**: Insert each batch into the sink
//! 5. **Collect**: Re-index rejected rows against the whole source
//! 6. **Report**: Generate export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use quarry::adapters::bigquery::{BigQueryClient, BigQueryConfig};
//! use quarry::adapters::source::JsonLinesSource;
//! use quarry::core::export::{ExportSpec, Exporter};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = JsonLinesSource::open("items.jsonl", None)?;
//! let sink = BigQueryClient::new(BigQueryConfig::default())?;
//!
//! let spec = ExportSpec::builder()
//!     .table_id("my-project.analytics.items")
//!     .fields(["id", "name", "date_created"])
//!     .build()?;
//!
//! let exporter = Exporter::new(spec, source, sink)?;
//! let row_errors = exporter.export(None, None)?;
//!
//! println!("Rejected rows: {}", row_errors.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod transform;
