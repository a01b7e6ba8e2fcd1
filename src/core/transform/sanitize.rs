//! Value sanitization
//!
//! Converts raw [`FieldValue`]s into sink-compliant JSON scalars:
//! - timestamps → `YYYY-MM-DD HH:MM:SS` in UTC
//! - UUIDs → canonical hyphenated string
//! - strings in `TIMESTAMP`/`DATETIME` columns that parse as timestamps →
//!   the same UTC format
//! - nulls → passed through, or replaced by a type default taken from the
//!   sink schema when `replace_nulls_with_empty` is set
//! - everything else unchanged

use crate::domain::{FieldType, FieldValue, SchemaInfo, Timestamp};
use serde_json::{json, Value};

/// Output format for timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp for the sink
///
/// Timezone-aware values are converted to UTC first. Naive values are
/// assumed to already be UTC and are formatted as-is.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use quarry::core::transform::format_timestamp;
/// use quarry::domain::Timestamp;
///
/// let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
/// let noon = plus_two.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(format_timestamp(&Timestamp::from(noon)), "2023-01-01 10:00:00");
/// ```
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.utc_naive().format(TIMESTAMP_FORMAT).to_string()
}

/// Default written in place of a null for a column of the given type
///
/// Columns missing from the schema, and types without a dedicated default,
/// get an empty string.
pub fn null_default(field_type: Option<&FieldType>) -> Value {
    match field_type {
        Some(FieldType::Integer) => json!(0),
        Some(FieldType::Float) | Some(FieldType::Numeric) => json!(0.0),
        Some(FieldType::Boolean) => json!(false),
        Some(FieldType::Json) => json!("{}"),
        Some(FieldType::Record) => json!({}),
        _ => json!(""),
    }
}

/// Sanitizer bound to one sink schema and null policy
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'a> {
    schema: &'a SchemaInfo,
    replace_nulls_with_empty: bool,
}

impl<'a> Sanitizer<'a> {
    pub fn new(schema: &'a SchemaInfo, replace_nulls_with_empty: bool) -> Self {
        Self {
            schema,
            replace_nulls_with_empty,
        }
    }

    /// Sanitize the value read for `field`
    pub fn sanitize(&self, field: &str, value: FieldValue) -> Value {
        match value {
            FieldValue::Null if self.replace_nulls_with_empty => {
                null_default(self.schema.field_type(field))
            }
            FieldValue::Null => Value::Null,
            FieldValue::Timestamp(ts) => Value::String(format_timestamp(&ts)),
            FieldValue::Uuid(uuid) => Value::String(uuid.hyphenated().to_string()),
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Int(i) => Value::from(i),
            FieldValue::Float(f) => Value::from(f),
            FieldValue::String(s) => self.sanitize_string(field, s),
            FieldValue::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            FieldValue::Json(value) => value,
        }
    }

    /// Text sources such as JSON lines carry timestamps as strings
    fn sanitize_string(&self, field: &str, s: String) -> Value {
        match self.schema.field_type(field) {
            Some(FieldType::Timestamp) | Some(FieldType::Datetime) => match Timestamp::parse(&s) {
                Ok(ts) => Value::String(format_timestamp(&ts)),
                Err(_) => Value::String(s),
            },
            _ => Value::String(s),
        }
    }
}
