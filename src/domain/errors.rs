//! Domain error types
//!
//! This module defines the error hierarchy for Quarry.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Quarry error type
///
/// Construction-time misconfiguration, call-time argument errors and sink
/// transport failures are all raised through this type. Row-level rejections
/// are never errors; they are returned as [`RowError`](crate::domain::RowError)
/// data by the exporter.
#[derive(Debug, Error)]
pub enum QuarryError {
    /// Static misconfiguration of an export job
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bounded batching requested over an unordered source that spans more than one batch
    #[error(
        "Configuration error: batch size {batch_size} is smaller than the record count \
         {record_count} but the record source is not explicitly ordered; slicing it across \
         batch boundaries may skip or duplicate records"
    )]
    UnorderedBatch {
        batch_size: usize,
        record_count: usize,
    },

    /// Malformed argument passed to an export call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The sink call itself failed (as opposed to rejecting individual rows)
    #[error("Sink transport error: {0}")]
    SinkTransport(#[from] SinkError),

    /// Record source errors
    #[error("Record source error: {0}")]
    Source(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl QuarryError {
    /// Whether this error belongs to the configuration family
    ///
    /// [`QuarryError::UnorderedBatch`] is a specialised configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            QuarryError::Configuration(_) | QuarryError::UnorderedBatch { .. }
        )
    }
}

/// Sink transport errors
///
/// Errors raised when the call to the analytical store fails outright or
/// exhausts its retry deadline. These errors don't expose HTTP client types.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to reach the sink
    #[error("Failed to connect to sink: {0}")]
    ConnectionFailed(String),

    /// Credentials rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Target table does not exist
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Retry deadline elapsed before the call succeeded
    #[error("Retry deadline of {deadline_secs}s exceeded after {attempts} attempt(s): {last_error}")]
    DeadlineExceeded {
        deadline_secs: u64,
        attempts: usize,
        last_error: String,
    },

    /// Response body could not be understood
    #[error("Invalid response from sink: {0}")]
    InvalidResponse(String),

    /// Count or other query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl SinkError {
    /// Whether a retry of the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SinkError::ConnectionFailed(_) => true,
            SinkError::ServerError { .. } => true,
            SinkError::ClientError { status, .. } => *status == 429,
            _ => false,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for QuarryError {
    fn from(err: std::io::Error) -> Self {
        QuarryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for QuarryError {
    fn from(err: serde_json::Error) -> Self {
        QuarryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for QuarryError {
    fn from(err: toml::de::Error) -> Self {
        QuarryError::Configuration(format!("TOML parse error: {err}"))
    }
}
