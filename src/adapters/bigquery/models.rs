//! BigQuery REST API models
//!
//! Request and response bodies for the three endpoints the sink uses. These
//! are kept separate from domain types; conversion happens at the edges.

use crate::domain::{ProcessedRow, QuarryError, Result, RowError, SchemaInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Parsed table identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableReference {
    /// Parse `project.dataset.table`, `project:dataset.table` or `dataset.table`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the identifier is malformed, or has no
    /// project and no default project is given.
    pub fn parse(id: &str, default_project: Option<&str>) -> Result<Self> {
        let malformed = || {
            QuarryError::Configuration(format!(
                "Invalid table id '{id}'. Expected project.dataset.table or dataset.table"
            ))
        };

        let (project, rest) = match id.split_once(':') {
            Some((project, rest)) => (Some(project), rest),
            None => (None, id),
        };

        let parts: Vec<&str> = rest.split('.').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(malformed());
        }

        let (project, dataset, table) = match (project, parts.as_slice()) {
            (Some(project), [dataset, table]) => (project, *dataset, *table),
            (None, [project, dataset, table]) => (*project, *dataset, *table),
            (None, [dataset, table]) => {
                let project = default_project.filter(|p| !p.is_empty()).ok_or_else(|| {
                    QuarryError::Configuration(format!(
                        "Table id '{id}' has no project and no default project is configured"
                    ))
                })?;
                (project, *dataset, *table)
            }
            _ => return Err(malformed()),
        };

        if project.trim().is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            project_id: project.to_string(),
            dataset_id: dataset.to_string(),
            table_id: table.to_string(),
        })
    }

    /// Path of the table resource below the API root
    pub fn path(&self) -> String {
        format!(
            "projects/{}/datasets/{}/tables/{}",
            self.project_id, self.dataset_id, self.table_id
        )
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// `tables.get` response (the parts we read)
#[derive(Debug, Deserialize)]
pub struct TableResource {
    #[serde(default)]
    pub schema: SchemaInfo,
}

/// `tabledata.insertAll` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllRequest<'a> {
    pub rows: Vec<InsertRow<'a>>,
    pub skip_invalid_rows: bool,
    pub ignore_unknown_values: bool,
}

impl<'a> InsertAllRequest<'a> {
    pub fn new(rows: &'a [ProcessedRow]) -> Self {
        Self {
            rows: rows.iter().map(|json| InsertRow { json }).collect(),
            skip_invalid_rows: false,
            ignore_unknown_values: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InsertRow<'a> {
    pub json: &'a ProcessedRow,
}

/// `tabledata.insertAll` response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllResponse {
    /// Rejected rows, indexed relative to the request
    #[serde(default)]
    pub insert_errors: Vec<RowError>,
}

/// `jobs.query` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub use_legacy_sql: bool,
    pub timeout_ms: u64,
}

/// `jobs.query` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub job_complete: bool,

    #[serde(default)]
    pub rows: Vec<TableRow>,
}

impl QueryResponse {
    /// Cell values, row by row
    pub fn into_values(self) -> Vec<Vec<Value>> {
        self.rows
            .into_iter()
            .map(|row| row.f.into_iter().map(|cell| cell.v).collect())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub v: Value,
}

/// Error envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}
