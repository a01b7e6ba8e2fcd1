//! Newline-delimited JSON record source
//!
//! Each non-blank line of the file is one JSON object. The file is re-read on
//! every slice so only the requested window is ever held in memory. Line order
//! is the record order, so the source is always explicitly ordered.

use super::traits::{Record, RecordSource};
use crate::domain::{FieldValue, QuarryError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A record parsed from one JSON line
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRecord(Map<String, Value>);

impl JsonRecord {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Keys present on this record
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl Record for JsonRecord {
    /// Keys absent from the object read as null
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        Some(
            self.0
                .get(name)
                .cloned()
                .map(FieldValue::from_json)
                .unwrap_or(FieldValue::Null),
        )
    }
}

/// Record source reading a `.jsonl` file
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
    attributes: Vec<String>,
}

impl JsonLinesSource {
    /// Open a JSON lines file
    ///
    /// If `attributes` is `None` the record shape is taken from the keys of
    /// the first record in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its first record is
    /// not a JSON object.
    pub fn open(path: impl AsRef<Path>, attributes: Option<Vec<String>>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(QuarryError::Configuration(format!(
                "Record source file not found: {}",
                path.display()
            )));
        }

        let mut source = Self {
            path,
            attributes: Vec::new(),
        };

        source.attributes = match attributes {
            Some(attributes) => attributes,
            None => source
                .slice(0, 1)?
                .first()
                .map(|record| record.keys().cloned().collect())
                .unwrap_or_default(),
        };

        tracing::debug!(
            path = %source.path.display(),
            attributes = ?source.attributes,
            "Opened JSON lines source"
        );

        Ok(source)
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lines(&self) -> Result<impl Iterator<Item = (usize, std::io::Result<String>)>> {
        let file = File::open(&self.path).map_err(|e| {
            QuarryError::Source(format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        Ok(BufReader::new(file)
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map(|l| !l.trim().is_empty()).unwrap_or(true)))
    }

    fn parse_line(&self, line_no: usize, line: &str) -> Result<JsonRecord> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Ok(JsonRecord::new(map)),
            Ok(_) => Err(QuarryError::Source(format!(
                "{}:{}: expected a JSON object",
                self.path.display(),
                line_no + 1
            ))),
            Err(e) => Err(QuarryError::Serialization(format!(
                "{}:{}: {}",
                self.path.display(),
                line_no + 1,
                e
            ))),
        }
    }
}

impl RecordSource for JsonLinesSource {
    type Record = JsonRecord;

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn attributes(&self) -> Vec<String> {
        self.attributes.clone()
    }

    fn count(&self) -> Result<usize> {
        let mut total = 0;
        for (_, line) in self.lines()? {
            line?;
            total += 1;
        }
        Ok(total)
    }

    fn slice(&self, start: usize, end: usize) -> Result<Vec<JsonRecord>> {
        let mut records = Vec::new();

        for (position, (line_no, line)) in self.lines()?.enumerate() {
            if position >= end {
                break;
            }
            let line = line?;
            if position >= start {
                records.push(self.parse_line(line_no, &line)?);
            }
        }

        Ok(records)
    }

    fn is_ordered(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_lines(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_count_skips_blank_lines() {
        let file = write_lines(&[r#"{"id": 1}"#, "", r#"{"id": 2}"#, "   ", r#"{"id": 3}"#]);
        let source = JsonLinesSource::open(file.path(), None).unwrap();

        assert_eq!(source.count().unwrap(), 3);
    }

    #[test]
    fn test_slice_window() {
        let file = write_lines(&[
            r#"{"id": 1}"#,
            r#"{"id": 2}"#,
            r#"{"id": 3}"#,
            r#"{"id": 4}"#,
        ]);
        let source = JsonLinesSource::open(file.path(), None).unwrap();

        let window = source.slice(1, 3).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].attribute("id"), Some(FieldValue::Int(2)));
        assert_eq!(window[1].attribute("id"), Some(FieldValue::Int(3)));
    }

    #[test]
    fn test_attributes_inferred_from_first_record() {
        let file = write_lines(&[r#"{"id": 1, "name": "a"}"#]);
        let source = JsonLinesSource::open(file.path(), None).unwrap();

        let mut attributes = source.attributes();
        attributes.sort();
        assert_eq!(attributes, vec!["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_explicit_attributes_win() {
        let file = write_lines(&[r#"{"id": 1}"#]);
        let source =
            JsonLinesSource::open(file.path(), Some(vec!["id".into(), "name".into()])).unwrap();

        assert_eq!(source.attributes(), vec!["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_missing_key_reads_as_null() {
        let file = write_lines(&[r#"{"id": 1}"#]);
        let source = JsonLinesSource::open(file.path(), None).unwrap();

        let records = source.records().unwrap();
        assert_eq!(records[0].attribute("name"), Some(FieldValue::Null));
    }

    #[test]
    fn test_non_object_line_is_error() {
        let file = write_lines(&[r#"{"id": 1}"#, "[1, 2]"]);
        let source = JsonLinesSource::open(file.path(), None).unwrap();

        assert!(matches!(source.slice(0, 2), Err(QuarryError::Source(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = JsonLinesSource::open("/nonexistent/records.jsonl", None);
        assert!(matches!(result, Err(QuarryError::Configuration(_))));
    }
}
