//! Check command implementation
//!
//! This module implements the `check` command, which reports whether the
//! target table already holds rows (optionally for one pull date). Useful
//! for skipping an export that already ran.

use super::{
    build_exporter, exit_code_for, resolve_project, EXIT_CONFIG, EXIT_INVALID_ARGUMENT, EXIT_OK,
    EXIT_ROW_ERRORS,
};
use crate::config::load_config;
use crate::core::transform::format_timestamp;
use crate::domain::Timestamp;
use clap::Args;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Only count rows stamped with this pull date
    #[arg(long, value_name = "TIMESTAMP")]
    pub pull_date: Option<String>,
}

impl CheckArgs {
    /// Execute the check command
    ///
    /// Exits 0 when the table has data and 1 when it is empty.
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking target table for data");

        let pull_date = match self.pull_date.as_deref().map(Timestamp::parse).transpose() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{e}");
                return Ok(EXIT_INVALID_ARGUMENT);
            }
        };

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Err(e) = resolve_project(&mut config) {
            println!("❌ {e}");
            return Ok(EXIT_CONFIG);
        }

        let exporter = match build_exporter(&config, true) {
            Ok(e) => e,
            Err(e) => {
                crate::log_error_with_context!(e, "Failed to connect to BigQuery");
                println!("❌ Failed to connect to BigQuery");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let has_data = match exporter.table_has_data(pull_date.as_ref()) {
            Ok(h) => h,
            Err(e) => {
                crate::log_error_with_context!(e, "Failed to count rows");
                println!("❌ Failed to count rows");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let scope = pull_date
            .as_ref()
            .map(|p| format!(" for pull date {}", format_timestamp(p)))
            .unwrap_or_default();

        if has_data {
            println!("✅ {} has data{scope}", config.job.table_id);
            Ok(EXIT_OK)
        } else {
            println!("📭 {} is empty{scope}", config.job.table_id);
            Ok(EXIT_ROW_ERRORS)
        }
    }
}
