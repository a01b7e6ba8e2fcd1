//! Field resolution
//!
//! Turns one record into one [`ProcessedRow`]. Each declared field is bound
//! either to a registered custom extractor or to a record attribute of the
//! same name. Attribute values are sanitized; custom values are taken as
//! already sink-ready.

use super::sanitize::{format_timestamp, Sanitizer};
use crate::adapters::source::Record;
use crate::core::export::ExportSpec;
use crate::domain::{ProcessedRow, QuarryError, Result, Timestamp};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Custom field extractor
///
/// Receives the export job and the record, and returns a sink-ready value.
/// The value is written to the row without sanitization.
pub type CustomField<R> = Box<dyn Fn(&ExportSpec<R>, &R) -> Value + Send + Sync>;

/// Named custom field extractors for one export job
pub struct FieldRegistry<R> {
    fields: BTreeMap<String, CustomField<R>>,
}

impl<R> FieldRegistry<R> {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Register an extractor under `name`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name is empty or already taken.
    pub fn register<F>(&mut self, name: impl Into<String>, extractor: F) -> Result<()>
    where
        F: Fn(&ExportSpec<R>, &R) -> Value + Send + Sync + 'static,
    {
        self.register_boxed(name.into(), Box::new(extractor))
    }

    pub(crate) fn register_boxed(&mut self, name: String, extractor: CustomField<R>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(QuarryError::Configuration(
                "Custom field name cannot be empty".to_string(),
            ));
        }
        if self.fields.contains_key(&name) {
            return Err(QuarryError::Configuration(format!(
                "Custom field '{name}' is registered more than once"
            )));
        }
        self.fields.insert(name, extractor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CustomField<R>> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R> Default for FieldRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for FieldRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.fields.keys()).finish()
    }
}

/// Resolve one field of one record
///
/// # Errors
///
/// Returns a source error if the field has no custom extractor and the record
/// has no attribute of that name.
pub fn resolve_field<R: Record>(
    spec: &ExportSpec<R>,
    sanitizer: &Sanitizer<'_>,
    field: &str,
    record: &R,
) -> Result<Value> {
    if let Some(extractor) = spec.custom_fields().get(field) {
        return Ok(extractor(spec, record));
    }

    let raw = record.attribute(field).ok_or_else(|| {
        QuarryError::Source(format!("Record has no attribute named '{field}'"))
    })?;

    Ok(sanitizer.sanitize(field, raw))
}

/// Build the row pushed to the sink for one record
///
/// Fields appear in declaration order. When the job includes a pull date,
/// the formatted pull time is written last under the configured column name.
///
/// # Errors
///
/// Propagates field resolution errors.
pub fn process_record<R: Record>(
    spec: &ExportSpec<R>,
    sanitizer: &Sanitizer<'_>,
    record: &R,
    pull_time: &Timestamp,
) -> Result<ProcessedRow> {
    let mut row = ProcessedRow::new();

    for field in spec.fields() {
        let value = resolve_field(spec, sanitizer, field, record)?;
        row.insert(field.clone(), value);
    }

    if spec.include_pull_date() {
        row.insert(
            spec.pull_date_field_name().to_string(),
            Value::String(format_timestamp(pull_time)),
        );
    }

    Ok(row)
}
