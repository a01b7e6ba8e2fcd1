//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Quarry configuration file without contacting BigQuery.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::adapters::source::JsonRecord;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Load configuration (also runs section validation)
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Job-level checks the exporter would run at construction
        let spec = match config.job.spec_builder::<JsonRecord>().build() {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Export job is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Source: {}", config.source.path);
        println!("  Table: {}", spec.table_id());
        println!("  Columns: {:?}", spec.output_columns());
        println!("  Batch Size: {}", spec.batch_size());
        println!("  Replace Nulls: {}", spec.replace_nulls_with_empty());
        println!("  Retry Deadline: {}s", spec.retry_deadline().as_secs());
        println!("  BigQuery Endpoint: {}", config.bigquery.base_url);
        if let Some(project) = &config.bigquery.project {
            println!("  BigQuery Project: {project}");
        }
        println!();
        Ok(EXIT_OK)
    }
}
