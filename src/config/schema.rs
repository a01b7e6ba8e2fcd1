//! Configuration schema types
//!
//! This module defines the configuration structure for Quarry.

use crate::config::SecretString;
use crate::core::export::{BatchSize, ExportSpecBuilder, DEFAULT_PULL_DATE_FIELD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main Quarry configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Record source
    pub source: SourceConfig,

    /// Export job definition
    pub job: JobConfig,

    /// BigQuery sink
    #[serde(default)]
    pub bigquery: BigQueryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl QuarryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.job.validate()?;
        self.bigquery.validate(&self.job.table_id)?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (log inserts instead of sending them)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Record source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to a newline-delimited JSON file
    pub path: String,

    /// Attributes every record exposes (inferred from the first record if unset)
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("source.path cannot be empty".to_string());
        }
        if let Some(attributes) = &self.attributes {
            if attributes.iter().any(|a| a.trim().is_empty()) {
                return Err("source.attributes cannot contain empty names".to_string());
            }
        }
        Ok(())
    }
}

/// Export job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Sink table (`project.dataset.table` or `dataset.table`)
    pub table_id: String,

    /// Fields to export, in output order
    pub fields: Vec<String>,

    /// Records per insert call, or "unbounded"
    #[serde(default)]
    pub batch_size: BatchSize,

    /// Replace nulls with a default for the column type
    #[serde(default)]
    pub replace_nulls_with_empty: bool,

    /// Stamp every row with the pull time
    #[serde(default = "default_true")]
    pub include_pull_date: bool,

    /// Column receiving the pull time
    #[serde(default = "default_pull_date_field_name")]
    pub pull_date_field_name: String,

    /// Upper bound on time spent retrying one insert call
    #[serde(default = "default_retry_deadline_secs")]
    pub retry_deadline_secs: u64,
}

impl JobConfig {
    fn validate(&self) -> Result<(), String> {
        if self.table_id.trim().is_empty() {
            return Err("job.table_id cannot be empty".to_string());
        }

        if self.fields.is_empty() {
            return Err("job.fields must contain at least one field".to_string());
        }

        if self.include_pull_date && self.pull_date_field_name.trim().is_empty() {
            return Err(
                "job.pull_date_field_name cannot be empty when include_pull_date is set"
                    .to_string(),
            );
        }

        if self.retry_deadline_secs == 0 {
            return Err("job.retry_deadline_secs must be > 0".to_string());
        }

        Ok(())
    }

    /// Start an export job builder from this configuration
    pub fn spec_builder<R>(&self) -> ExportSpecBuilder<R> {
        ExportSpecBuilder::new()
            .table_id(&self.table_id)
            .fields(self.fields.iter().cloned())
            .batch_size(self.batch_size)
            .replace_nulls_with_empty(self.replace_nulls_with_empty)
            .include_pull_date(self.include_pull_date)
            .pull_date_field_name(&self.pull_date_field_name)
            .retry_deadline(Duration::from_secs(self.retry_deadline_secs))
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.initial_delay_ms == 0 {
            return Err("bigquery.retry.initial_delay_ms must be > 0".to_string());
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(
                "bigquery.retry.max_delay_ms must be >= bigquery.retry.initial_delay_ms"
                    .to_string(),
            );
        }
        if self.backoff_multiplier < 1.0 {
            return Err("bigquery.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let delay_ms = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis(delay_ms.min(self.max_delay_ms as f64) as u64)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// BigQuery sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// Default project for `dataset.table` identifiers
    #[serde(default)]
    pub project: Option<String>,

    /// REST API root
    #[serde(default = "default_bigquery_base_url")]
    pub base_url: String,

    /// OAuth2 bearer token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Timeout in seconds for a single HTTP request
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl BigQueryConfig {
    fn validate(&self, table_id: &str) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("bigquery.base_url must start with http:// or https://".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("bigquery.timeout_seconds must be > 0".to_string());
        }

        if let Some(token) = &self.access_token {
            if token.expose_secret().is_empty() {
                return Err("bigquery.access_token cannot be empty when set".to_string());
            }
        }

        let names_project = table_id.contains(':') || table_id.split('.').count() >= 3;
        if !names_project
            && self.project.as_deref().map(str::is_empty).unwrap_or(true)
        {
            return Err(format!(
                "bigquery.project is required when job.table_id '{table_id}' has no project"
            ));
        }

        self.retry.validate()
    }
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            project: None,
            base_url: default_bigquery_base_url(),
            access_token: None,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled is set".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pull_date_field_name() -> String {
    DEFAULT_PULL_DATE_FIELD.to_string()
}

fn default_retry_deadline_secs() -> u64 {
    300
}

fn default_bigquery_base_url() -> String {
    "https://bigquery.googleapis.com/bigquery/v2".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::FieldValue;
    use std::collections::HashMap;

    fn job() -> JobConfig {
        JobConfig {
            table_id: "proj.ds.items".to_string(),
            fields: vec!["id".to_string(), "name".to_string()],
            batch_size: BatchSize::default(),
            replace_nulls_with_empty: false,
            include_pull_date: true,
            pull_date_field_name: "pull_date".to_string(),
            retry_deadline_secs: 300,
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_job_config_validation() {
        let mut config = job();
        assert!(config.validate().is_ok());

        config.fields.clear();
        assert!(config.validate().is_err());

        config = job();
        config.table_id = " ".to_string();
        assert!(config.validate().is_err());

        config = job();
        config.retry_deadline_secs = 0;
        assert!(config.validate().is_err());

        config = job();
        config.pull_date_field_name = String::new();
        assert!(config.validate().is_err());
        config.include_pull_date = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_job_config_builds_spec() {
        let mut config = job();
        config.batch_size = BatchSize::bounded(50).unwrap();
        config.retry_deadline_secs = 30;

        let spec = config
            .spec_builder::<HashMap<String, FieldValue>>()
            .build()
            .unwrap();

        assert_eq!(spec.table_id(), "proj.ds.items");
        assert_eq!(spec.fields(), &["id".to_string(), "name".to_string()]);
        assert_eq!(spec.batch_size().get(), Some(50));
        assert_eq!(spec.retry_deadline(), Duration::from_secs(30));
    }

    #[test]
    fn test_bigquery_config_validation() {
        let mut config = BigQueryConfig::default();
        assert!(config.validate("proj.ds.items").is_ok());
        assert!(config.validate("ds.items").is_err());

        config.project = Some("proj".to_string());
        assert!(config.validate("ds.items").is_ok());

        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate("proj.ds.items").is_err());

        config = BigQueryConfig {
            access_token: Some(secret_string(String::new())),
            ..Default::default()
        };
        assert!(config.validate("proj.ds.items").is_err());
    }

    #[test]
    fn test_retry_config_validation() {
        let mut retry = RetryConfig::default();
        assert!(retry.validate().is_ok());

        retry.backoff_multiplier = 0.5;
        assert!(retry.validate().is_err());

        retry = RetryConfig {
            initial_delay_ms: 5000,
            max_delay_ms: 1000,
            backoff_multiplier: 2.0,
        };
        assert!(retry.validate().is_err());
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let retry = RetryConfig {
            initial_delay_ms: 100,
            max_delay_ms: 1000,
            backoff_multiplier: 2.0,
        };

        assert_eq!(retry.delay_for(1), Duration::from_millis(100));
        assert_eq!(retry.delay_for(2), Duration::from_millis(200));
        assert_eq!(retry.delay_for(4), Duration::from_millis(800));
        assert_eq!(retry.delay_for(5), Duration::from_millis(1000));
        assert_eq!(retry.delay_for(60), Duration::from_millis(1000));
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = String::new();
        assert!(config.validate().is_err());
    }
}
