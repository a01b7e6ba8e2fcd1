//! Sink abstraction traits
//!
//! This module defines the interface an analytical store must implement to
//! receive exported rows.

use crate::domain::{ProcessedRow, QuarryError, Result, RowError, SchemaInfo};
use serde_json::Value;
use std::time::Duration;

/// Handle to a sink table, carrying its column schema
#[derive(Debug, Clone, PartialEq)]
pub struct TableHandle {
    /// Fully-qualified table identifier
    pub table_id: String,

    /// Declared columns
    pub schema: SchemaInfo,
}

impl TableHandle {
    pub fn new(table_id: impl Into<String>, schema: SchemaInfo) -> Self {
        Self {
            table_id: table_id.into(),
            schema,
        }
    }
}

/// Tabular result of a sink query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self { rows }
    }

    /// Interpret the first cell of the first row as a count
    ///
    /// Counts may arrive as JSON numbers or as decimal strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is empty or the cell is not a
    /// non-negative integer.
    pub fn scalar_count(&self) -> Result<u64> {
        let cell = self
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| QuarryError::Serialization("Count query returned no rows".to_string()))?;

        match cell {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            QuarryError::Serialization(format!("Count query returned a non-integer value: {cell}"))
        })
    }
}

/// Sink client trait
///
/// Calls are synchronous. A call either succeeds, possibly reporting per-row
/// rejections as data, or fails as a whole with a transport error.
pub trait SinkClient {
    /// Fetch a table and its column schema
    ///
    /// # Errors
    ///
    /// Returns a transport error if the table cannot be fetched.
    fn get_table(&self, table_id: &str) -> Result<TableHandle>;

    /// Insert rows into a table
    ///
    /// # Arguments
    ///
    /// * `table` - Table handle from [`get_table`](SinkClient::get_table)
    /// * `rows` - Rows to insert, in order
    /// * `retry_deadline` - Upper bound on time spent retrying this call
    ///
    /// # Returns
    ///
    /// Rows the sink rejected, indexed relative to `rows`. Empty on success.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the call fails or the deadline elapses.
    fn insert_rows(
        &self,
        table: &TableHandle,
        rows: &[ProcessedRow],
        retry_deadline: Option<Duration>,
    ) -> Result<Vec<RowError>>;

    /// Run a query
    ///
    /// # Errors
    ///
    /// Returns a transport error if the query fails.
    fn query(&self, sql: &str) -> Result<QueryResult>;

    /// Whether inserts are only logged, not sent
    fn is_dry_run(&self) -> bool {
        false
    }
}
