//! Rows pushed to the sink and the per-row errors it reports back

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat mapping from column name to sanitized scalar, ready for insertion
pub type ProcessedRow = Map<String, Value>;

/// One reason a sink rejected a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowErrorDetail {
    /// Machine-readable reason code (e.g. `invalid`)
    #[serde(default)]
    pub reason: Option<String>,

    /// Column or location the error refers to
    #[serde(default)]
    pub location: Option<String>,

    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

impl RowErrorDetail {
    /// Create a detail with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            reason: None,
            location: None,
            message: message.into(),
        }
    }

    /// Set the reason code
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A row rejected by the sink within an otherwise successful push
///
/// The sink reports `index` relative to the batch it received. Once the
/// exporter has processed it, `index` is relative to the full record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Position of the rejected row
    pub index: usize,

    /// Reasons the row was rejected
    #[serde(default)]
    pub errors: Vec<RowErrorDetail>,
}

impl RowError {
    /// Create a row error with a single message
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            errors: vec![RowErrorDetail::new(message)],
        }
    }

    /// Shift the index by the start offset of the batch the row belonged to
    pub fn offset_by(mut self, batch_start: usize) -> Self {
        self.index += batch_start;
        self
    }

    /// All messages joined into one line
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.location {
                Some(location) => format!("{location}: {}", e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offset_by() {
        let err = RowError::new(0, "bad value").offset_by(3);
        assert_eq!(err.index, 3);
    }

    #[test]
    fn test_message_joins_details() {
        let err = RowError {
            index: 1,
            errors: vec![
                RowErrorDetail::new("no such field").with_location("colour"),
                RowErrorDetail::new("row too large").with_reason("invalid"),
            ],
        };
        assert_eq!(err.message(), "colour: no such field; row too large");
    }

    #[test]
    fn test_deserialize_insert_error_shape() {
        let err: RowError = serde_json::from_value(json!({
            "index": 2,
            "errors": [{
                "reason": "invalid",
                "location": "name",
                "debugInfo": "",
                "message": "Cannot convert value to string."
            }]
        }))
        .unwrap();

        assert_eq!(err.index, 2);
        assert_eq!(err.errors[0].reason.as_deref(), Some("invalid"));
        assert_eq!(err.errors[0].location.as_deref(), Some("name"));
    }
}
