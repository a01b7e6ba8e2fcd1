//! Export job definition
//!
//! [`ExportSpec`] is the static description of one export: which fields go to
//! which table, how records are batched, and how nulls and the pull date are
//! handled. It is built once through [`ExportSpecBuilder`] and is immutable
//! afterwards.

use super::batch::BatchSize;
use super::validation::validate_spec;
use crate::core::transform::{CustomField, FieldRegistry};
use crate::domain::Result;
use serde_json::Value;
use std::time::Duration;

/// Default column written with the pull time
pub const DEFAULT_PULL_DATE_FIELD: &str = "pull_date";

/// Default upper bound on time spent retrying one insert call
pub const DEFAULT_RETRY_DEADLINE: Duration = Duration::from_secs(300);

/// Static description of an export job
#[derive(Debug)]
pub struct ExportSpec<R> {
    table_id: String,
    fields: Vec<String>,
    batch_size: BatchSize,
    replace_nulls_with_empty: bool,
    include_pull_date: bool,
    pull_date_field_name: String,
    retry_deadline: Duration,
    custom_fields: FieldRegistry<R>,
}

impl<R> ExportSpec<R> {
    pub fn builder() -> ExportSpecBuilder<R> {
        ExportSpecBuilder::new()
    }

    /// Sink table identifier
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Declared output fields, in output order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn replace_nulls_with_empty(&self) -> bool {
        self.replace_nulls_with_empty
    }

    pub fn include_pull_date(&self) -> bool {
        self.include_pull_date
    }

    pub fn pull_date_field_name(&self) -> &str {
        &self.pull_date_field_name
    }

    pub fn retry_deadline(&self) -> Duration {
        self.retry_deadline
    }

    pub fn custom_fields(&self) -> &FieldRegistry<R> {
        &self.custom_fields
    }

    /// Declared fields read straight from record attributes
    pub fn attribute_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|field| !self.custom_fields.contains(field))
    }

    /// Every column a pushed row carries, pull date included
    pub fn output_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        if self.include_pull_date {
            columns.push(&self.pull_date_field_name);
        }
        columns
    }
}

/// Builder for [`ExportSpec`]
pub struct ExportSpecBuilder<R> {
    table_id: Option<String>,
    fields: Vec<String>,
    batch_size: BatchSize,
    replace_nulls_with_empty: bool,
    include_pull_date: bool,
    pull_date_field_name: String,
    retry_deadline: Duration,
    custom_fields: Vec<(String, CustomField<R>)>,
}

impl<R> ExportSpecBuilder<R> {
    pub fn new() -> Self {
        Self {
            table_id: None,
            fields: Vec::new(),
            batch_size: BatchSize::default(),
            replace_nulls_with_empty: false,
            include_pull_date: true,
            pull_date_field_name: DEFAULT_PULL_DATE_FIELD.to_string(),
            retry_deadline: DEFAULT_RETRY_DEADLINE,
            custom_fields: Vec::new(),
        }
    }

    pub fn table_id(mut self, table_id: impl Into<String>) -> Self {
        self.table_id = Some(table_id.into());
        self
    }

    /// Set the declared fields, replacing any set before
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn batch_size(mut self, batch_size: BatchSize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn replace_nulls_with_empty(mut self, replace: bool) -> Self {
        self.replace_nulls_with_empty = replace;
        self
    }

    pub fn include_pull_date(mut self, include: bool) -> Self {
        self.include_pull_date = include;
        self
    }

    pub fn pull_date_field_name(mut self, name: impl Into<String>) -> Self {
        self.pull_date_field_name = name.into();
        self
    }

    pub fn retry_deadline(mut self, deadline: Duration) -> Self {
        self.retry_deadline = deadline;
        self
    }

    /// Register a custom extractor for a declared field
    ///
    /// Name clashes are reported by [`build`](Self::build).
    pub fn custom_field<F>(mut self, name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&ExportSpec<R>, &R) -> Value + Send + Sync + 'static,
    {
        self.custom_fields.push((name.into(), Box::new(extractor)));
        self
    }

    /// Build the job
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - the table id is missing or blank
    /// - no fields are declared, or a field is declared twice
    /// - the pull date column name is blank or collides with a declared field
    /// - a custom field name is blank, registered twice, or not declared
    pub fn build(self) -> Result<ExportSpec<R>> {
        let mut registry = FieldRegistry::new();
        for (name, extractor) in self.custom_fields {
            registry.register_boxed(name, extractor)?;
        }

        let spec = ExportSpec {
            table_id: self.table_id.unwrap_or_default(),
            fields: self.fields,
            batch_size: self.batch_size,
            replace_nulls_with_empty: self.replace_nulls_with_empty,
            include_pull_date: self.include_pull_date,
            pull_date_field_name: self.pull_date_field_name,
            retry_deadline: self.retry_deadline,
            custom_fields: registry,
        };

        validate_spec(&spec)?;
        Ok(spec)
    }
}

impl<R> Default for ExportSpecBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
