//! CLI command implementations
//!
//! This module contains all CLI command implementations plus the wiring they
//! share: turning a loaded configuration into a ready [`Exporter`].

pub mod check;
pub mod export;
pub mod init;
pub mod validate;

use crate::adapters::bigquery::{BigQueryClient, TableReference};
use crate::adapters::source::{JsonLinesSource, JsonRecord};
use crate::config::QuarryConfig;
use crate::core::export::Exporter;
use crate::domain::{QuarryError, SinkError};

/// Exit code: success
pub const EXIT_OK: i32 = 0;
/// Exit code: the sink rejected rows, or `check` found no data
pub const EXIT_ROW_ERRORS: i32 = 1;
/// Exit code: invalid configuration
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: invalid command-line argument
pub const EXIT_INVALID_ARGUMENT: i32 = 3;
/// Exit code: the sink could not be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code: anything else
pub const EXIT_FATAL: i32 = 5;

/// Exporter over the configured JSON lines file and BigQuery table
pub type CliExporter = Exporter<JsonLinesSource, BigQueryClient>;

/// Map an error to the process exit code reported for it
pub fn exit_code_for(error: &QuarryError) -> i32 {
    match error {
        e if e.is_configuration() => EXIT_CONFIG,
        QuarryError::InvalidArgument(_) => EXIT_INVALID_ARGUMENT,
        QuarryError::SinkTransport(SinkError::TableNotFound(_)) => EXIT_CONFIG,
        QuarryError::SinkTransport(_) => EXIT_CONNECTION,
        QuarryError::Source(_) | QuarryError::Io(_) => EXIT_CONFIG,
        _ => EXIT_FATAL,
    }
}

/// Fill `bigquery.project` from a fully qualified table id when unset
///
/// Count queries are issued against a project, so one must be known even
/// when the configuration only names it inside `job.table_id`.
pub fn resolve_project(config: &mut QuarryConfig) -> crate::domain::Result<()> {
    if config.bigquery.project.as_deref().is_some_and(|p| !p.is_empty()) {
        return Ok(());
    }

    let reference = TableReference::parse(&config.job.table_id, None)?;
    tracing::debug!(project = %reference.project_id, "Using project from job.table_id");
    config.bigquery.project = Some(reference.project_id);
    Ok(())
}

/// Open the source, connect to BigQuery and validate the job against both
///
/// # Errors
///
/// Returns configuration errors for a bad job or source, and transport errors
/// if the table schema cannot be fetched.
pub fn build_exporter(config: &QuarryConfig, dry_run: bool) -> crate::domain::Result<CliExporter> {
    let source = JsonLinesSource::open(&config.source.path, config.source.attributes.clone())?;

    let spec = config.job.spec_builder::<JsonRecord>().build()?;

    let client = BigQueryClient::new(config.bigquery.clone())?.with_dry_run(dry_run);

    Exporter::new(spec, source, client)
}
