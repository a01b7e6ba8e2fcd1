//! Export command implementation
//!
//! This module implements the `export` command for pushing the configured
//! record source into the BigQuery table in batches.

use super::{
    build_exporter, exit_code_for, resolve_project, EXIT_CONFIG, EXIT_INVALID_ARGUMENT, EXIT_OK,
    EXIT_ROW_ERRORS,
};
use crate::config::load_config;
use crate::core::export::BatchSize;
use crate::core::transform::format_timestamp;
use crate::domain::Timestamp;
use clap::Args;

/// Row errors printed before the rest are summarised
const MAX_ERRORS_SHOWN: usize = 10;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - log inserts without sending them to BigQuery
    #[arg(long)]
    pub dry_run: bool,

    /// Pull date stamped on every row (defaults to now)
    #[arg(long, value_name = "TIMESTAMP")]
    pub pull_date: Option<String>,

    /// Override batch size (positive integer or "unbounded")
    #[arg(long, value_name = "SIZE")]
    pub batch_size: Option<BatchSize>,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let pull_date = match self.pull_date.as_deref().map(Timestamp::parse).transpose() {
            Ok(p) => p,
            Err(e) => {
                crate::log_error_with_context!(e, "Invalid --pull-date");
                eprintln!("{e}");
                return Ok(EXIT_INVALID_ARGUMENT);
            }
        };

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                crate::log_error_with_context!(e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Apply CLI overrides
        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size = %batch_size, "Overriding batch size from CLI");
            config.job.batch_size = batch_size;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = resolve_project(&mut config) {
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no rows will be inserted");
            println!("🔍 DRY RUN MODE - No rows will be written to BigQuery");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !dry_run {
            println!("Export Configuration:");
            println!("  Source: {}", config.source.path);
            println!("  Table: {}", config.job.table_id);
            println!("  Fields: {:?}", config.job.fields);
            println!("  Batch size: {}", config.job.batch_size);
            println!(
                "  Pull date: {}",
                pull_date
                    .as_ref()
                    .map(format_timestamp)
                    .unwrap_or_else(|| "now".to_string())
            );
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(EXIT_OK);
            }
        }

        tracing::info!("Creating exporter");
        let exporter = match build_exporter(&config, dry_run) {
            Ok(e) => e,
            Err(e) => {
                crate::log_error_with_context!(e, "Failed to create exporter");
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Starting export...");
        println!();

        let summary = match exporter.export_with_summary(pull_date, None) {
            Ok(s) => s,
            Err(e) => {
                crate::log_error_with_context!(e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        // Display summary
        println!();
        println!("📊 Export Summary:");
        println!("  Table: {}", summary.table_id);
        println!("  Pull date: {}", format_timestamp(&summary.pull_time));
        println!("  Total Records: {}", summary.total_records);
        println!("  Batches: {}", summary.batches_processed);
        println!("  Rows Pushed: {}", summary.rows_pushed);
        println!("  Rows Rejected: {}", summary.row_errors.len());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());
        println!();

        if !summary.row_errors.is_empty() {
            println!("⚠️  Rejected rows:");
            for error in summary.row_errors.iter().take(MAX_ERRORS_SHOWN) {
                println!("  - row {}: {}", error.index, error.message());
            }
            if summary.row_errors.len() > MAX_ERRORS_SHOWN {
                println!(
                    "  ... and {} more",
                    summary.row_errors.len() - MAX_ERRORS_SHOWN
                );
            }
            println!();
        }

        let exit_code = if summary.is_successful() {
            println!("✅ Export completed successfully!");
            EXIT_OK
        } else {
            println!("⚠️  Export completed with rejected rows");
            EXIT_ROW_ERRORS
        };

        Ok(exit_code)
    }
}
