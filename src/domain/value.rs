//! Raw field values read from source records
//!
//! [`FieldValue`] is what a record hands back for a named attribute before
//! sanitization. [`Timestamp`] keeps the distinction between timezone-aware and
//! timezone-naive instants, which the sanitizer treats differently.

use crate::domain::{QuarryError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

/// A point in time, with or without timezone information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// Carries an explicit UTC offset
    Aware(DateTime<FixedOffset>),
    /// No timezone information; treated as already being UTC
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Current time as an aware UTC timestamp
    pub fn now() -> Self {
        Timestamp::Aware(Utc::now().into())
    }

    /// The wall-clock time in UTC
    ///
    /// Aware values are converted to UTC. Naive values are returned unchanged,
    /// with no shift from the local timezone.
    pub fn utc_naive(&self) -> NaiveDateTime {
        match self {
            Timestamp::Aware(dt) => dt.with_timezone(&Utc).naive_utc(),
            Timestamp::Naive(naive) => *naive,
        }
    }

    /// Parse a timestamp supplied as text (e.g. a `--pull-date` argument)
    ///
    /// Accepted forms:
    /// - RFC 3339 (`2023-01-15T08:30:00+02:00`, `2023-01-15T06:30:00Z`) → aware
    /// - `2023-01-15 08:30:00` or `2023-01-15T08:30:00`, optional fraction → naive
    /// - `2023-01-15` → naive midnight
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::InvalidArgument`] if the text matches none of them.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Timestamp::Aware(dt));
        }

        for format in [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
        ] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
                return Ok(Timestamp::Naive(naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Ok(Timestamp::from(date));
        }

        Err(QuarryError::InvalidArgument(format!(
            "'{input}' is not a timestamp (expected RFC 3339, YYYY-MM-DD HH:MM:SS or YYYY-MM-DD)"
        )))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        let offset = dt.offset().fix();
        Timestamp::Aware(dt.with_timezone(&offset))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Timestamp::Naive(naive)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Timestamp::Naive(date.and_time(NaiveTime::default()))
    }
}

/// Raw value of one record attribute
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(Timestamp),
    Date(NaiveDate),
    Uuid(Uuid),
    /// Structured or otherwise already-JSON value
    Json(Value),
}

impl FieldValue {
    /// Whether the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Lift a JSON value read from a JSON-backed source
    ///
    /// Integral numbers become [`FieldValue::Int`], other numbers
    /// [`FieldValue::Float`]. Arrays and objects stay as JSON.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .unwrap_or(FieldValue::Json(Value::Number(n))),
            },
            Value::String(s) => FieldValue::String(s),
            other => FieldValue::Json(other),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(value: Timestamp) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Timestamp(Timestamp::Naive(value))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for FieldValue {
    fn from(value: DateTime<Tz>) -> Self {
        FieldValue::Timestamp(Timestamp::from(value))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
