//! Sink-side column schema
//!
//! The exporter fetches the sink table's columns once at construction and
//! keeps them as [`SchemaInfo`] for validation and null-default lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared column type in the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Numeric,
    Boolean,
    Timestamp,
    Date,
    Time,
    Datetime,
    Record,
    Bytes,
    Json,
    /// Any type name not listed above (e.g. `GEOGRAPHY`)
    Other(String),
}

impl FieldType {
    /// Canonical type name
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "STRING",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::Numeric => "NUMERIC",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Datetime => "DATETIME",
            FieldType::Record => "RECORD",
            FieldType::Bytes => "BYTES",
            FieldType::Json => "JSON",
            FieldType::Other(name) => name,
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "STRING" => FieldType::String,
            "INTEGER" | "INT64" => FieldType::Integer,
            "FLOAT" | "FLOAT64" => FieldType::Float,
            "NUMERIC" | "BIGNUMERIC" => FieldType::Numeric,
            "BOOLEAN" | "BOOL" => FieldType::Boolean,
            "TIMESTAMP" => FieldType::Timestamp,
            "DATE" => FieldType::Date,
            "TIME" => FieldType::Time,
            "DATETIME" => FieldType::Datetime,
            "RECORD" | "STRUCT" => FieldType::Record,
            "BYTES" => FieldType::Bytes,
            "JSON" => FieldType::Json,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        FieldType::from(name.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a sink table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// NULLABLE, REQUIRED or REPEATED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: None,
        }
    }
}

/// The ordered set of columns declared by a sink table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    #[serde(default)]
    pub fields: Vec<ColumnSchema>,
}

impl SchemaInfo {
    pub fn new(fields: Vec<ColumnSchema>) -> Self {
        Self { fields }
    }

    /// Whether the table declares a column with this name
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|c| c.name == name)
    }

    /// Declared type of a column, if the column exists
    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.field_type)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|c| c.name.as_str()).collect()
    }
}
