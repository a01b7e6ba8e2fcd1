//! Export orchestrator
//!
//! [`Exporter`] drives one export job end to end: it validates the job against
//! the source and the sink table once at construction, then for every export
//! call cuts the source into batches, turns each record into a row, pushes
//! each batch and collects the rows the sink rejects.

use super::batch::{batch_source, Batch, BatchResult};
use super::job::ExportSpec;
use super::summary::ExportSummary;
use super::validation::{validate_against_sink, validate_against_source};
use crate::adapters::sink::{SinkClient, TableHandle};
use crate::adapters::source::RecordSource;
use crate::core::transform::{format_timestamp, process_record, Sanitizer};
use crate::domain::{QuarryError, Result, RowError, SchemaInfo, Timestamp};
use crate::{log_batch_processing, log_export_complete, log_export_start};
use std::collections::HashSet;
use std::time::Instant;
use tracing::Span;

/// Export orchestrator for one job
///
/// Owns the job definition, the default record source, the sink client and the
/// sink table handle fetched at construction. Calls are synchronous and
/// batches are pushed strictly in ascending offset order.
pub struct Exporter<S: RecordSource, C: SinkClient> {
    spec: ExportSpec<S::Record>,
    source: S,
    sink: C,
    table: TableHandle,
    span: Span,
}

impl<S: RecordSource, C: SinkClient> Exporter<S, C> {
    /// Create an exporter
    ///
    /// Fetches the sink table and validates every declared field against the
    /// source attributes and the table columns.
    ///
    /// # Errors
    ///
    /// - [`QuarryError::Configuration`] if a field cannot be resolved against
    ///   the source or is not a column of the table
    /// - [`QuarryError::SinkTransport`] if the table cannot be fetched
    pub fn new(spec: ExportSpec<S::Record>, source: S, sink: C) -> Result<Self> {
        let source_name = source.describe();
        validate_against_source(&spec, &source_name, &source.attributes())?;

        let table = sink.get_table(spec.table_id()).map_err(|e| {
            tracing::error!(
                table = %spec.table_id(),
                error = %e,
                "Failed to fetch sink table"
            );
            e
        })?;
        validate_against_sink(&spec, &table.schema)?;

        let span = tracing::info_span!(
            "export_job",
            table = %spec.table_id(),
            source = %source_name
        );

        tracing::debug!(
            table = %spec.table_id(),
            source = %source_name,
            fields = ?spec.fields(),
            batch_size = %spec.batch_size(),
            "Export job ready"
        );

        Ok(Self {
            spec,
            source,
            sink,
            table,
            span,
        })
    }

    /// Replace the span every log line of this job is emitted in
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn spec(&self) -> &ExportSpec<S::Record> {
        &self.spec
    }

    /// Default record source
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    /// Cached sink table schema
    pub fn schema(&self) -> &SchemaInfo {
        &self.table.schema
    }

    /// Export every record and return the rows the sink rejected
    ///
    /// # Arguments
    ///
    /// * `pull_date` - Pull time stamped on every row; defaults to now
    /// * `record_source` - Records to export instead of the default source
    ///
    /// # Returns
    ///
    /// Rejected rows with indices relative to the whole record source. Empty
    /// when every row was accepted.
    ///
    /// # Errors
    ///
    /// - [`QuarryError::InvalidArgument`] if `record_source` lacks a declared field
    /// - [`QuarryError::UnorderedBatch`] if the source spans several batches but
    ///   is not explicitly ordered
    /// - [`QuarryError::SinkTransport`] if a push fails; remaining batches are
    ///   not sent
    pub fn export(
        &self,
        pull_date: Option<Timestamp>,
        record_source: Option<&S>,
    ) -> Result<Vec<RowError>> {
        self.export_with_summary(pull_date, record_source)
            .map(|summary| summary.row_errors)
    }

    /// Export every record and return the full summary
    ///
    /// Same contract as [`export`](Self::export).
    pub fn export_with_summary(
        &self,
        pull_date: Option<Timestamp>,
        record_source: Option<&S>,
    ) -> Result<ExportSummary> {
        let _entered = self.span.enter();
        let started = Instant::now();

        if let Some(supplied) = record_source {
            self.check_record_source(supplied)?;
        }
        let source = record_source.unwrap_or(&self.source);

        let total = source.count()?;
        self.check_ordering(source, total)?;

        let pull_time = pull_date.unwrap_or_else(Timestamp::now);
        let sanitizer = Sanitizer::new(&self.table.schema, self.spec.replace_nulls_with_empty());

        log_export_start!(self.spec.table_id(), source.describe(), total);

        let mut summary = ExportSummary::new(self.spec.table_id(), pull_time.clone(), total)
            .with_dry_run(self.sink.is_dry_run());

        for batch in batch_source(source, self.spec.batch_size())? {
            let result = self.process_batch(batch?, &sanitizer, &pull_time)?;
            summary.record_batch(result);
        }

        let summary = summary.with_duration(started.elapsed());
        log_export_complete!(summary.total_records, summary.duration);
        summary.log_summary();

        Ok(summary)
    }

    /// Whether the sink table already holds rows
    ///
    /// When the job stamps a pull date and `pull_date` is given, only rows
    /// with that pull date are counted.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the count query fails.
    pub fn table_has_data(&self, pull_date: Option<&Timestamp>) -> Result<bool> {
        let _entered = self.span.enter();

        let sql = self.count_query(pull_date);
        tracing::debug!(sql = %sql, "Checking sink table for data");

        let count = self
            .sink
            .query(&sql)
            .map_err(|e| {
                tracing::error!(table = %self.spec.table_id(), error = %e, "Count query failed");
                e
            })?
            .scalar_count()?;

        tracing::info!(table = %self.spec.table_id(), count, "Sink table row count");
        Ok(count > 0)
    }

    fn count_query(&self, pull_date: Option<&Timestamp>) -> String {
        let table = self.spec.table_id();
        match pull_date {
            Some(pull_date) if self.spec.include_pull_date() => format!(
                "SELECT COUNT(*) FROM `{}` WHERE `{}` = '{}'",
                table,
                self.spec.pull_date_field_name(),
                format_timestamp(pull_date)
            ),
            _ => format!("SELECT COUNT(*) FROM `{table}`"),
        }
    }

    fn check_record_source(&self, source: &S) -> Result<()> {
        let attributes: HashSet<String> = source.attributes().into_iter().collect();
        let missing: Vec<&str> = self
            .spec
            .attribute_fields()
            .filter(|field| !attributes.contains(*field))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(QuarryError::InvalidArgument(format!(
                "Record source '{}' does not expose declared field(s): {}",
                source.describe(),
                missing.join(", ")
            )))
        }
    }

    fn check_ordering(&self, source: &S, total: usize) -> Result<()> {
        let batch_size = self.spec.batch_size();
        match batch_size.get() {
            Some(size) if batch_size.splits(total) && !source.is_ordered() => {
                Err(QuarryError::UnorderedBatch {
                    batch_size: size,
                    record_count: total,
                })
            }
            _ => Ok(()),
        }
    }

    fn process_batch(
        &self,
        batch: Batch<'_, S>,
        sanitizer: &Sanitizer<'_>,
        pull_time: &Timestamp,
    ) -> Result<BatchResult> {
        log_batch_processing!(batch.start, batch.end, batch.total);

        let mut result = BatchResult::new(batch.start, batch.end);
        let rows = batch
            .records
            .into_records()?
            .iter()
            .map(|record| process_record(&self.spec, sanitizer, record, pull_time))
            .collect::<Result<Vec<_>>>()?;

        if rows.is_empty() {
            return Ok(result);
        }

        let row_errors = self
            .sink
            .insert_rows(&self.table, &rows, Some(self.spec.retry_deadline()))
            .map_err(|e| {
                tracing::error!(
                    table = %self.spec.table_id(),
                    batch_start = result.start,
                    batch_end = result.end,
                    error = %e,
                    "Failed to push batch"
                );
                e
            })?;

        result.rows_pushed = rows.len();
        result.add_row_errors(row_errors);

        for row_error in &result.row_errors {
            tracing::warn!(
                table = %self.spec.table_id(),
                index = row_error.index,
                error = %row_error.message(),
                "Row rejected by sink"
            );
        }

        Ok(result)
    }
}
