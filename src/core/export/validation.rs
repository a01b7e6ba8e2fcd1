//! Export job validation
//!
//! Runs when a job is built and when an exporter is constructed. Every check
//! here fails with a configuration error naming the offending field, so a
//! job that validates can never fail field resolution at export time.

use super::job::ExportSpec;
use crate::domain::{QuarryError, Result, SchemaInfo};
use std::collections::HashSet;

/// Check the job definition on its own
///
/// # Errors
///
/// Returns a configuration error for a blank table id, an empty or duplicated
/// field list, a blank or colliding pull date column, a custom field that
/// is not a declared field, or a backtick in a name quoted into SQL.
pub fn validate_spec<R>(spec: &ExportSpec<R>) -> Result<()> {
    if spec.table_id().trim().is_empty() {
        return Err(QuarryError::Configuration(
            "Export job has no sink table identifier".to_string(),
        ));
    }

    // Quoted with backticks in the table_has_data query
    if spec.table_id().contains('`') {
        return Err(QuarryError::Configuration(format!(
            "Table identifier '{}' cannot contain a backtick",
            spec.table_id()
        )));
    }

    if spec.fields().is_empty() {
        return Err(QuarryError::Configuration(format!(
            "Export job for '{}' declares no fields",
            spec.table_id()
        )));
    }

    let mut seen = HashSet::new();
    for field in spec.fields() {
        if field.trim().is_empty() {
            return Err(QuarryError::Configuration(
                "Declared field names cannot be empty".to_string(),
            ));
        }
        if !seen.insert(field.as_str()) {
            return Err(QuarryError::Configuration(format!(
                "Field '{field}' is declared more than once"
            )));
        }
    }

    if spec.include_pull_date() {
        let pull_date = spec.pull_date_field_name();
        if pull_date.trim().is_empty() {
            return Err(QuarryError::Configuration(
                "pull_date_field_name cannot be empty when include_pull_date is set".to_string(),
            ));
        }
        if pull_date.contains('`') {
            return Err(QuarryError::Configuration(format!(
                "Pull date column '{pull_date}' cannot contain a backtick"
            )));
        }
        if seen.contains(pull_date) {
            return Err(QuarryError::Configuration(format!(
                "Pull date column '{pull_date}' collides with a declared field"
            )));
        }
    }

    if let Some(unused) = spec.custom_fields().names().find(|name| !seen.contains(name)) {
        return Err(QuarryError::Configuration(format!(
            "Custom field '{unused}' is registered but not declared in the field list"
        )));
    }

    Ok(())
}

/// Check declared fields against the attributes a source exposes
///
/// Every declared field must be a source attribute or a custom field.
///
/// # Errors
///
/// Returns a configuration error naming the first unresolvable field.
pub fn validate_against_source<R>(
    spec: &ExportSpec<R>,
    source_name: &str,
    attributes: &[String],
) -> Result<()> {
    let attributes: HashSet<&str> = attributes.iter().map(String::as_str).collect();

    match spec.attribute_fields().find(|field| !attributes.contains(field)) {
        Some(field) => Err(QuarryError::Configuration(format!(
            "Field '{field}' is neither an attribute of '{source_name}' nor a registered custom field"
        ))),
        None => Ok(()),
    }
}

/// Check every output column against the sink table schema
///
/// The pull date column is included only when the job stamps it.
///
/// # Errors
///
/// Returns a configuration error naming the first missing column and the table.
pub fn validate_against_sink<R>(spec: &ExportSpec<R>, schema: &SchemaInfo) -> Result<()> {
    match spec
        .output_columns()
        .into_iter()
        .find(|column| !schema.contains(column))
    {
        Some(column) => Err(QuarryError::Configuration(format!(
            "Field '{column}' is not a column of sink table '{}'",
            spec.table_id()
        ))),
        None => Ok(()),
    }
}
