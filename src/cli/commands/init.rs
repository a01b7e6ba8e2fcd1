//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "quarry.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Quarry configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your source file and table", self.output);
                println!("  2. Create a .env file with QUARRY_BIGQUERY_TOKEN set to an OAuth2 access token");
                println!("  3. Validate configuration: quarry validate-config");
                println!("  4. Run export: quarry export");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Quarry Configuration File

[application]
log_level = "info"
dry_run = false

[source]
path = "data/items.jsonl"

[job]
table_id = "my-project.analytics.items"
fields = ["id", "name", "date_created"]
batch_size = 1000
replace_nulls_with_empty = false
include_pull_date = true
pull_date_field_name = "pull_date"
retry_deadline_secs = 300

[bigquery]
access_token = "${QUARRY_BIGQUERY_TOKEN}"
timeout_seconds = 60

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Quarry Configuration File
#
# Exports records from a JSON lines file into a BigQuery table in batches.
# Values of the form ${VAR} are replaced from the environment, and any key
# can be overridden with QUARRY_<SECTION>_<KEY> (e.g. QUARRY_JOB_BATCH_SIZE).

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (fetch the schema but log inserts instead of sending them)
dry_run = false

# ============================================================================
# Record Source
# ============================================================================
[source]
# Newline-delimited JSON, one object per line, in a stable order
path = "data/items.jsonl"

# Attributes every record exposes (inferred from the first record if unset)
# attributes = ["id", "name", "date_created", "price"]

# ============================================================================
# Export Job
# ============================================================================
[job]
# Target table: project.dataset.table, project:dataset.table or dataset.table
table_id = "my-project.analytics.items"

# Columns to export, in order. Each must exist in the source and the table.
fields = ["id", "name", "date_created"]

# Records per insert call: a positive integer or "unbounded"
batch_size = 1000

# Replace nulls with a type-appropriate empty value (0, 0.0, false, "", {})
replace_nulls_with_empty = false

# Stamp every row with the pull time
include_pull_date = true
pull_date_field_name = "pull_date"

# Seconds an insert call may keep retrying transient failures
retry_deadline_secs = 300

# ============================================================================
# BigQuery
# ============================================================================
[bigquery]
# Default project for dataset.table identifiers
# project = "my-project"

# REST API root (point at an emulator for local testing)
# base_url = "http://localhost:9050/bigquery/v2"

# OAuth2 bearer token (use environment variable)
access_token = "${QUARRY_BIGQUERY_TOKEN}"

# Timeout in seconds for a single HTTP request
timeout_seconds = 60

# Backoff between retries of transient failures
[bigquery.retry]
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging
local_enabled = false

# Directory for log files
local_path = "./logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}
