//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::QuarryConfig;
use super::secret::secret_string;
use crate::domain::{QuarryError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into QuarryConfig
/// 4. Applies environment variable overrides (QUARRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - An override cannot be parsed
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use quarry::config::load_config;
///
/// let config = load_config("quarry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<QuarryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(QuarryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        QuarryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parses and validates configuration text
///
/// Same pipeline as [`load_config`] minus the file read.
///
/// # Errors
///
/// See [`load_config`].
pub fn parse_config(contents: &str) -> Result<QuarryConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: QuarryConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        QuarryError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| QuarryError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                if !missing_vars.iter().any(|v| v == var_name) {
                    missing_vars.push(var_name.to_string());
                }
                String::new()
            })
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(QuarryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        QuarryError::Configuration(format!("Invalid value '{value}' for {name}: {e}"))
    })
}

/// Applies environment variable overrides using QUARRY_* prefix
///
/// Environment variables follow the pattern: QUARRY_<SECTION>_<KEY>
/// For example: QUARRY_JOB_BATCH_SIZE, QUARRY_BIGQUERY_ACCESS_TOKEN
fn apply_env_overrides(config: &mut QuarryConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("QUARRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("QUARRY_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("QUARRY_APPLICATION_DRY_RUN", &val)?;
    }

    // Source overrides
    if let Some(val) = var("QUARRY_SOURCE_PATH") {
        config.source.path = val;
    }

    // Job overrides
    if let Some(val) = var("QUARRY_JOB_TABLE_ID") {
        config.job.table_id = val;
    }
    if let Some(val) = var("QUARRY_JOB_FIELDS") {
        config.job.fields = val
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
    }
    if let Some(val) = var("QUARRY_JOB_BATCH_SIZE") {
        config.job.batch_size = val.parse()?;
    }
    if let Some(val) = var("QUARRY_JOB_REPLACE_NULLS_WITH_EMPTY") {
        config.job.replace_nulls_with_empty =
            parse_override("QUARRY_JOB_REPLACE_NULLS_WITH_EMPTY", &val)?;
    }
    if let Some(val) = var("QUARRY_JOB_INCLUDE_PULL_DATE") {
        config.job.include_pull_date = parse_override("QUARRY_JOB_INCLUDE_PULL_DATE", &val)?;
    }
    if let Some(val) = var("QUARRY_JOB_PULL_DATE_FIELD_NAME") {
        config.job.pull_date_field_name = val;
    }
    if let Some(val) = var("QUARRY_JOB_RETRY_DEADLINE_SECS") {
        config.job.retry_deadline_secs = parse_override("QUARRY_JOB_RETRY_DEADLINE_SECS", &val)?;
    }

    // BigQuery overrides
    if let Some(val) = var("QUARRY_BIGQUERY_PROJECT") {
        config.bigquery.project = Some(val);
    }
    if let Some(val) = var("QUARRY_BIGQUERY_BASE_URL") {
        config.bigquery.base_url = val;
    }
    if let Some(val) = var("QUARRY_BIGQUERY_ACCESS_TOKEN") {
        config.bigquery.access_token = Some(secret_string(val));
    }
    if let Some(val) = var("QUARRY_BIGQUERY_TIMEOUT_SECONDS") {
        config.bigquery.timeout_seconds = parse_override("QUARRY_BIGQUERY_TIMEOUT_SECONDS", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("QUARRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("QUARRY_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("QUARRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("QUARRY_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[source]
path = "items.jsonl"

[job]
table_id = "proj.ds.items"
fields = ["id", "name"]
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("QUARRY_LOADER_TEST_VAR", "test_value");
        let input = "token = \"${QUARRY_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("QUARRY_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("QUARRY_LOADER_MISSING_VAR");
        let input = "token = \"${QUARRY_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(matches!(result, Err(QuarryError::Configuration(msg)) if msg.contains("QUARRY_LOADER_MISSING_VAR")));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("QUARRY_LOADER_COMMENTED_VAR");
        let input = "# token = \"${QUARRY_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(QuarryError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.source.path, "items.jsonl");
        assert_eq!(config.job.table_id, "proj.ds.items");
        assert_eq!(config.job.batch_size.get(), Some(1000));
        assert!(config.job.include_pull_date);
        assert_eq!(config.application.log_level, "info");
        assert!(!config.application.dry_run);
    }

    #[test]
    fn test_parse_config_rejects_invalid() {
        let invalid = MINIMAL.replace(r#"fields = ["id", "name"]"#, "fields = []");
        assert!(matches!(
            parse_config(&invalid),
            Err(QuarryError::Configuration(_))
        ));
    }
}
