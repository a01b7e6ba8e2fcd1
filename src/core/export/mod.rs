//! Export orchestration and batch processing
//!
//! This module provides the core export logic for Quarry, including:
//! - Export job definition and validation
//! - Lazy batching of record sources
//! - Export orchestration against a sink
//! - Summary and reporting

pub mod batch;
pub mod coordinator;
pub mod job;
pub mod summary;
pub mod validation;

pub use batch::{batch_source, Batch, BatchRecords, BatchResult, BatchSize, Batches};
pub use coordinator::Exporter;
pub use job::{ExportSpec, ExportSpecBuilder, DEFAULT_PULL_DATE_FIELD, DEFAULT_RETRY_DEADLINE};
pub use summary::ExportSummary;
pub use validation::{validate_against_sink, validate_against_source, validate_spec};
