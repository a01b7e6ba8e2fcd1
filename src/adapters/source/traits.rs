//! Record source abstraction traits
//!
//! This module defines the capability interface any upstream data source must
//! implement to be exported. The exporter never inspects concrete source types.

use crate::domain::{FieldValue, Result};

/// A single exported entity whose attributes can be read by name
pub trait Record {
    /// Read an attribute
    ///
    /// Returns `None` if the record has no attribute with this name.
    fn attribute(&self, name: &str) -> Option<FieldValue>;
}

/// An ordered, countable, sliceable collection of records
///
/// Implementations must return the same records in the same order for
/// repeated calls to [`slice`](RecordSource::slice) over an unchanged source.
/// Sources that cannot promise this must report `false` from
/// [`is_ordered`](RecordSource::is_ordered).
pub trait RecordSource {
    /// Record type produced by this source
    type Record: Record;

    /// Short human-readable identity used in log lines (e.g. a file path)
    fn describe(&self) -> String;

    /// Names of the attributes every record is expected to expose
    fn attributes(&self) -> Vec<String>;

    /// Total number of records
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn count(&self) -> Result<usize>;

    /// Records in the half-open range `[start, end)`
    ///
    /// `end` is clamped to the record count.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn slice(&self, start: usize, end: usize) -> Result<Vec<Self::Record>>;

    /// Every record, in source order
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn records(&self) -> Result<Vec<Self::Record>> {
        let total = self.count()?;
        self.slice(0, total)
    }

    /// Whether the source has an explicit, stable ordering
    fn is_ordered(&self) -> bool;
}

impl Record for std::collections::HashMap<String, FieldValue> {
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

impl Record for std::collections::BTreeMap<String, FieldValue> {
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_map_record_attribute() {
        let mut record: HashMap<String, FieldValue> = HashMap::new();
        record.insert("id".to_string(), FieldValue::Int(1));

        assert_eq!(record.attribute("id"), Some(FieldValue::Int(1)));
        assert_eq!(record.attribute("missing"), None);
    }
}
