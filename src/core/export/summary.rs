//! Export summary and reporting
//!
//! This module defines the structure returned by a completed export call.

use super::batch::BatchResult;
use crate::domain::{RowError, Timestamp};
use crate::core::transform::format_timestamp;
use std::time::Duration;

/// Summary of one export call
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Sink table identifier
    pub table_id: String,

    /// Records in the exported source
    pub total_records: usize,

    /// Batches pushed (or skipped as empty)
    pub batches_processed: usize,

    /// Rows sent to the sink
    pub rows_pushed: usize,

    /// Rows the sink rejected, indexed against the whole source
    pub row_errors: Vec<RowError>,

    /// Pull time stamped on the rows
    pub pull_time: Timestamp,

    /// Duration of the export
    pub duration: Duration,

    /// Whether the sink only logged the inserts
    pub dry_run: bool,
}

impl ExportSummary {
    /// Create an empty summary
    pub fn new(table_id: impl Into<String>, pull_time: Timestamp, total_records: usize) -> Self {
        Self {
            table_id: table_id.into(),
            total_records,
            batches_processed: 0,
            rows_pushed: 0,
            row_errors: Vec::new(),
            pull_time,
            duration: Duration::from_secs(0),
            dry_run: false,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Fold one batch outcome into the summary
    pub fn record_batch(&mut self, batch: BatchResult) {
        self.batches_processed += 1;
        self.rows_pushed += batch.rows_pushed;
        self.row_errors.extend(batch.row_errors);
    }

    /// Check if every pushed row was accepted
    pub fn is_successful(&self) -> bool {
        self.row_errors.is_empty()
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.rows_pushed == 0 {
            return 100.0;
        }
        let accepted = self.rows_pushed.saturating_sub(self.row_errors.len());
        (accepted as f64 / self.rows_pushed as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            table = %self.table_id,
            total_records = self.total_records,
            batches = self.batches_processed,
            rows_pushed = self.rows_pushed,
            failed = self.row_errors.len(),
            pull_time = %format_timestamp(&self.pull_time),
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            dry_run = self.dry_run,
            "Export completed"
        );

        if !self.row_errors.is_empty() {
            tracing::warn!(
                error_count = self.row_errors.len(),
                "Export completed with rejected rows"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ExportSummary {
        ExportSummary::new("proj.ds.items", Timestamp::now(), 10)
    }

    #[test]
    fn test_new_summary() {
        let summary = summary();
        assert_eq!(summary.total_records, 10);
        assert_eq!(summary.batches_processed, 0);
        assert!(summary.is_successful());
        assert_eq!(summary.success_rate(), 100.0);
        assert!(!summary.dry_run);
    }

    #[test]
    fn test_record_batch_accumulates() {
        let mut summary = summary();

        let mut first = BatchResult::new(0, 5);
        first.rows_pushed = 5;
        summary.record_batch(first);

        let mut second = BatchResult::new(5, 10);
        second.rows_pushed = 5;
        second.add_row_errors(vec![RowError::new(1, "bad value")]);
        summary.record_batch(second);

        assert_eq!(summary.batches_processed, 2);
        assert_eq!(summary.rows_pushed, 10);
        assert_eq!(summary.row_errors.len(), 1);
        assert_eq!(summary.row_errors[0].index, 6);
        assert!(!summary.is_successful());
        assert_eq!(summary.success_rate(), 90.0);
    }

    #[test]
    fn test_with_duration() {
        let summary = summary()
            .with_duration(Duration::from_secs(120))
            .with_dry_run(true);
        assert_eq!(summary.duration.as_secs(), 120);
        assert!(summary.dry_run);
    }
}
