//! Integration tests for configuration loading and validation
//!
//! Loading applies `QUARRY_*` overrides from the process environment, so every
//! test holds `ENV_MUTEX` while it loads.

use quarry::config::load_config;
use quarry::core::export::BatchSize;
use quarry::domain::QuarryError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tempfile::NamedTempFile;

// Mutex to serialize tests that read or modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDES: &[&str] = &[
    "QUARRY_APPLICATION_LOG_LEVEL",
    "QUARRY_APPLICATION_DRY_RUN",
    "QUARRY_SOURCE_PATH",
    "QUARRY_JOB_TABLE_ID",
    "QUARRY_JOB_FIELDS",
    "QUARRY_JOB_BATCH_SIZE",
    "QUARRY_JOB_INCLUDE_PULL_DATE",
    "QUARRY_BIGQUERY_ACCESS_TOKEN",
    "QUARRY_BIGQUERY_PROJECT",
    "TEST_BIGQUERY_TOKEN",
];

fn lock_env() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    for var in OVERRIDES {
        std::env::remove_var(var);
    }
    guard
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = lock_env();
    let toml_content = r#"
[application]
log_level = "debug"
dry_run = true

[source]
path = "data/items.jsonl"
attributes = ["id", "name", "date_created", "price"]

[job]
table_id = "ds.items"
fields = ["id", "name", "date_created"]
batch_size = 250
replace_nulls_with_empty = true
include_pull_date = true
pull_date_field_name = "loaded_at"
retry_deadline_secs = 120

[bigquery]
project = "analytics-prod"
base_url = "http://localhost:9050/bigquery/v2"
access_token = "ya29.test"
timeout_seconds = 30

[bigquery.retry]
initial_delay_ms = 200
max_delay_ms = 5000
backoff_multiplier = 3.0

[logging]
local_enabled = false
local_path = "/tmp/quarry"
local_rotation = "hourly"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Application
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    // Source
    assert_eq!(config.source.path, "data/items.jsonl");
    assert_eq!(config.source.attributes.as_ref().map(Vec::len), Some(4));

    // Job
    assert_eq!(config.job.table_id, "ds.items");
    assert_eq!(config.job.fields, vec!["id", "name", "date_created"]);
    assert_eq!(config.job.batch_size.get(), Some(250));
    assert!(config.job.replace_nulls_with_empty);
    assert_eq!(config.job.pull_date_field_name, "loaded_at");

    // BigQuery
    assert_eq!(config.bigquery.project.as_deref(), Some("analytics-prod"));
    assert_eq!(config.bigquery.base_url, "http://localhost:9050/bigquery/v2");
    let token = config.bigquery.access_token.as_ref().unwrap();
    assert_eq!(token.expose_secret(), "ya29.test");
    assert_eq!(config.bigquery.timeout_seconds, 30);
    assert_eq!(config.bigquery.retry.initial_delay_ms, 200);
    assert_eq!(config.bigquery.retry.backoff_multiplier, 3.0);

    // Logging
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/tmp/quarry");
    assert_eq!(config.logging.local_rotation, "hourly");

    // Job spec built from the config
    let spec = config
        .job
        .spec_builder::<std::collections::HashMap<String, quarry::domain::FieldValue>>()
        .build()
        .unwrap();
    assert_eq!(
        spec.output_columns(),
        vec!["id", "name", "date_created", "loaded_at"]
    );
    assert_eq!(spec.retry_deadline(), Duration::from_secs(120));
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = lock_env();

    let toml_content = r#"
[source]
path = "items.jsonl"

[job]
table_id = "proj.ds.items"
fields = ["id"]
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify defaults are applied
    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert!(config.source.attributes.is_none());
    assert_eq!(config.job.batch_size.get(), Some(1000));
    assert!(!config.job.replace_nulls_with_empty);
    assert!(config.job.include_pull_date);
    assert_eq!(config.job.pull_date_field_name, "pull_date");
    assert_eq!(config.job.retry_deadline_secs, 300);
    assert!(config.bigquery.project.is_none());
    assert_eq!(
        config.bigquery.base_url,
        "https://bigquery.googleapis.com/bigquery/v2"
    );
    assert!(config.bigquery.access_token.is_none());
    assert_eq!(config.bigquery.timeout_seconds, 60);
    assert_eq!(config.bigquery.retry.initial_delay_ms, 1000);
    assert_eq!(config.logging.local_rotation, "daily");
}

#[test]
fn test_unbounded_batch_size() {
    let _lock = lock_env();

    let toml_content = r#"
[source]
path = "items.jsonl"

[job]
table_id = "proj.ds.items"
fields = ["id"]
batch_size = "unbounded"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.job.batch_size, BatchSize::Unbounded);
}

#[test]
fn test_env_var_substitution() {
    let _lock = lock_env();
    std::env::set_var("TEST_BIGQUERY_TOKEN", "substituted-token");

    let toml_content = r#"
[source]
path = "items.jsonl"

[job]
table_id = "proj.ds.items"
fields = ["id"]

[bigquery]
# access_token = "${SOME_UNSET_VARIABLE}"
access_token = "${TEST_BIGQUERY_TOKEN}"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    let token = config.bigquery.access_token.as_ref().unwrap();
    assert_eq!(token.expose_secret(), "substituted-token");

    std::env::remove_var("TEST_BIGQUERY_TOKEN");
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = lock_env();

    let toml_content = r#"
[source]
path = "items.jsonl"

[job]
table_id = "proj.ds.items"
fields = ["id"]

[bigquery]
access_token = "${TEST_BIGQUERY_TOKEN}"
"#;

    let temp_file = write_config(toml_content);
    let result = load_config(temp_file.path());
    assert!(
        matches!(result, Err(QuarryError::Configuration(msg)) if msg.contains("TEST_BIGQUERY_TOKEN"))
    );
}

#[test]
fn test_env_var_overrides() {
    let _lock = lock_env();
    std::env::set_var("QUARRY_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("QUARRY_JOB_BATCH_SIZE", "2000");
    std::env::set_var("QUARRY_JOB_FIELDS", "id, name ,price");
    std::env::set_var("QUARRY_JOB_INCLUDE_PULL_DATE", "false");
    std::env::set_var("QUARRY_BIGQUERY_ACCESS_TOKEN", "override-token");

    let toml_content = r#"
[application]
log_level = "info"

[source]
path = "items.jsonl"

[job]
table_id = "proj.ds.items"
fields = ["id"]
batch_size = 500
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify env var overrides took effect
    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.job.batch_size.get(), Some(2000));
    assert_eq!(config.job.fields, vec!["id", "name", "price"]);
    assert!(!config.job.include_pull_date);
    let token = config.bigquery.access_token.as_ref().unwrap();
    assert_eq!(token.expose_secret(), "override-token");

    for var in OVERRIDES {
        std::env::remove_var(var);
    }
}

#[test]
fn test_invalid_override_value() {
    let _lock = lock_env();
    std::env::set_var("QUARRY_APPLICATION_DRY_RUN", "maybe");

    let toml_content = r#"
[source]
path = "items.jsonl"

[job]
table_id = "proj.ds.items"
fields = ["id"]
"#;

    let temp_file = write_config(toml_content);
    let result = load_config(temp_file.path());
    std::env::remove_var("QUARRY_APPLICATION_DRY_RUN");

    assert!(
        matches!(result, Err(QuarryError::Configuration(msg)) if msg.contains("QUARRY_APPLICATION_DRY_RUN"))
    );
}

#[test]
fn test_invalid_config_validation() {
    let _lock = lock_env();

    let cases = [
        // unknown log level
        "[application]\nlog_level = \"invalid_level\"\n[source]\npath = \"a.jsonl\"\n[job]\ntable_id = \"p.d.t\"\nfields = [\"id\"]\n",
        // zero batch size
        "[source]\npath = \"a.jsonl\"\n[job]\ntable_id = \"p.d.t\"\nfields = [\"id\"]\nbatch_size = 0\n",
        // no fields
        "[source]\npath = \"a.jsonl\"\n[job]\ntable_id = \"p.d.t\"\nfields = []\n",
        // table without project and no default project
        "[source]\npath = \"a.jsonl\"\n[job]\ntable_id = \"d.t\"\nfields = [\"id\"]\n",
        // missing [job] section
        "[source]\npath = \"a.jsonl\"\n",
    ];

    for toml_content in cases {
        let temp_file = write_config(toml_content);
        let result = load_config(temp_file.path());
        assert!(
            matches!(result, Err(QuarryError::Configuration(_))),
            "expected configuration error for:\n{toml_content}"
        );
    }
}
