//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted local file logs with rotation
//! - Shorthand macros for the export lifecycle
//!
//! # Example
//!
//! ```no_run
//! use quarry::logging::init_logging;
//! use quarry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an export operation
///
/// # Example
///
/// ```
/// use quarry::log_export_start;
///
/// log_export_start!("proj.ds.items", "items.jsonl", 1200);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($table:expr, $source:expr, $total:expr) => {
        tracing::info!(
            table = %$table,
            source = %$source,
            total_records = $total,
            "Starting export"
        );
    };
}

/// Log the completion of an export operation
///
/// # Example
///
/// ```
/// use quarry::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Finished exporting {} records in {:?}",
            $count,
            $duration
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```
/// use quarry::log_error_with_context;
/// use quarry::domain::QuarryError;
///
/// let error = QuarryError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a batch processing operation
///
/// # Example
///
/// ```
/// use quarry::log_batch_processing;
///
/// log_batch_processing!(0, 1000, 4200);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($start:expr, $end:expr, $total:expr) => {
        tracing::debug!(
            start = $start,
            end = $end,
            total = $total,
            progress_pct = ($end as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```
/// use quarry::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!(2, Duration::from_millis(400), "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Retrying sink call"
        );
    };
}
