//! Configuration management for Quarry.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Quarry uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `QUARRY_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quarry::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("quarry.toml")?;
//!
//! println!("Source: {}", config.source.path);
//! println!("Table: {}", config.job.table_id);
//! println!("Batch size: {}", config.job.batch_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run mode
//! - [`SourceConfig`] - JSON lines record source
//! - [`JobConfig`] - Fields, target table, batching and pull date settings
//! - [`BigQueryConfig`] - Sink endpoint, credentials and retry backoff
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! path = "data/items.jsonl"
//!
//! [job]
//! table_id = "my-project.analytics.items"
//! fields = ["id", "name", "date_created"]
//! batch_size = 1000
//!
//! [bigquery]
//! access_token = "${QUARRY_BIGQUERY_TOKEN}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BigQueryConfig, JobConfig, LoggingConfig, QuarryConfig, RetryConfig,
    SourceConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
