// Quarry - Batched exporter into BigQuery
// Copyright (c) 2025 Quarry Contributors
// Licensed under the MIT License

//! # Quarry - batched exports into BigQuery
//!
//! Quarry moves records from an ordered, countable source into a columnar
//! analytics table. Rows are built field by field, sanitized against the
//! table's schema and pushed in bounded batches. Rows the sink rejects come
//! back as data, indexed against the whole source.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Batching** a record source into contiguous, non-overlapping windows
//! - **Resolving** declared fields from record attributes or custom extractors
//! - **Sanitizing** values (timestamps, UUIDs, nulls) into sink-safe JSON
//! - **Validating** the job against the source and the sink schema up front
//! - **Exporting** batches and re-indexing per-row errors
//!
//! ## Architecture
//!
//! Quarry follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (export orchestration, batching, transformation)
//! - [`adapters`] - External integrations (record sources, BigQuery)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry::adapters::bigquery::BigQueryClient;
//! use quarry::adapters::source::{JsonLinesSource, JsonRecord};
//! use quarry::config::load_config;
//! use quarry::core::export::Exporter;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("quarry.toml")?;
//!
//!     let source = JsonLinesSource::open(&config.source.path, None)?;
//!     let spec = config.job.spec_builder::<JsonRecord>().build()?;
//!     let sink = BigQueryClient::new(config.bigquery.clone())?;
//!
//!     let exporter = Exporter::new(spec, source, sink)?;
//!     let row_errors = exporter.export(None, None)?;
//!
//!     println!("{} rows rejected", row_errors.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Fields
//!
//! A declared field can be computed from the whole record instead of read
//! off an attribute. Its value is sent as-is, without sanitization:
//!
//! ```rust
//! use quarry::core::export::ExportSpec;
//! use quarry::domain::FieldValue;
//! use std::collections::HashMap;
//! use serde_json::json;
//!
//! type Row = HashMap<String, FieldValue>;
//!
//! let spec = ExportSpec::<Row>::builder()
//!     .table_id("proj.ds.items")
//!     .fields(["id", "source_system"])
//!     .custom_field("source_system", |_spec, _record: &Row| json!("warehouse"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(spec.output_columns(), vec!["id", "source_system", "pull_date"]);
//! ```
//!
//! ## Error Handling
//!
//! Quarry uses the [`domain::QuarryError`] type for all errors. Static
//! misconfiguration fails at construction; transport failures abort an
//! export; per-row rejections are returned, never raised:
//!
//! ```rust,no_run
//! use quarry::domain::QuarryError;
//!
//! fn example() -> Result<(), QuarryError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = quarry::config::load_config("quarry.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Quarry uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(table = "proj.ds.items", "Starting export");
//! warn!(index = 3, "Row rejected by sink");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
