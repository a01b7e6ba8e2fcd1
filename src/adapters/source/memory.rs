//! In-memory record source
//!
//! Holds records in a `Vec`. Unordered until [`MemorySource::order_by`] or
//! [`MemorySource::assume_ordered`] is called, so batching a large unordered
//! collection is caught the same way it would be for a database query.

use super::traits::{Record, RecordSource};
use crate::domain::Result;

/// Record source backed by a vector
#[derive(Debug, Clone)]
pub struct MemorySource<R> {
    name: String,
    attributes: Vec<String>,
    records: Vec<R>,
    ordered: bool,
}

impl<R: Record + Clone> MemorySource<R> {
    /// Create an unordered source
    pub fn new<I, S>(name: impl Into<String>, attributes: I, records: Vec<R>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            records,
            ordered: false,
        }
    }

    /// Sort the records by key and mark the source as ordered
    pub fn order_by<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: FnMut(&R) -> K,
    {
        self.records.sort_by_key(key);
        self.ordered = true;
        self
    }

    /// Mark the current record order as explicit
    pub fn assume_ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record + Clone> RecordSource for MemorySource<R> {
    type Record = R;

    fn describe(&self) -> String {
        self.name.clone()
    }

    fn attributes(&self) -> Vec<String> {
        self.attributes.clone()
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn slice(&self, start: usize, end: usize) -> Result<Vec<R>> {
        let end = end.min(self.records.len());
        let start = start.min(end);
        Ok(self.records[start..end].to_vec())
    }

    fn is_ordered(&self) -> bool {
        self.ordered
    }
}
