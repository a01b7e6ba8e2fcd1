//! Batching of record sources
//!
//! A source is cut into contiguous half-open windows `[start, end)` that cover
//! it exactly once, in source order. Windows are produced lazily: each one is
//! read from the source only when the iterator reaches it.

use crate::adapters::source::RecordSource;
use crate::domain::{QuarryError, Result, RowError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroUsize;

/// Default number of records per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Records per batch
///
/// `Unbounded` sends the whole source as a single batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSize {
    Bounded(NonZeroUsize),
    Unbounded,
}

impl BatchSize {
    /// Bounded batch size
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `size` is zero.
    pub fn bounded(size: usize) -> Result<Self> {
        NonZeroUsize::new(size).map(Self::Bounded).ok_or_else(|| {
            QuarryError::Configuration(
                "batch_size must be a positive integer or \"unbounded\"".to_string(),
            )
        })
    }

    /// The bound, if any
    pub fn get(&self) -> Option<usize> {
        match self {
            Self::Bounded(n) => Some(n.get()),
            Self::Unbounded => None,
        }
    }

    /// Whether batching `record_count` records needs more than one batch
    pub fn splits(&self, record_count: usize) -> bool {
        matches!(self.get(), Some(n) if n < record_count)
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        match NonZeroUsize::new(DEFAULT_BATCH_SIZE) {
            Some(n) => Self::Bounded(n),
            None => Self::Unbounded,
        }
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl std::str::FromStr for BatchSize {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        let size = s.parse::<usize>().map_err(|_| {
            QuarryError::Configuration(format!(
                "Invalid batch size: {s}. Expected a positive integer or \"unbounded\""
            ))
        })?;
        Self::bounded(size)
    }
}

impl Serialize for BatchSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Bounded(n) => serializer.serialize_u64(n.get() as u64),
            Self::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for BatchSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Size(u64),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Size(n) => {
                let n = usize::try_from(n).map_err(serde::de::Error::custom)?;
                Self::bounded(n).map_err(serde::de::Error::custom)
            }
            Raw::Word(word) => word.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Records carried by a batch
pub enum BatchRecords<'a, S: RecordSource> {
    /// The source itself, unsliced (unbounded batching)
    Source(&'a S),
    /// A slice read from the source
    Slice(Vec<S::Record>),
}

impl<'a, S: RecordSource> BatchRecords<'a, S> {
    /// Materialize the records
    ///
    /// # Errors
    ///
    /// Propagates source read errors.
    pub fn into_records(self) -> Result<Vec<S::Record>> {
        match self {
            Self::Source(source) => source.records(),
            Self::Slice(records) => Ok(records),
        }
    }
}

/// One window over a record source
pub struct Batch<'a, S: RecordSource> {
    /// Offset of the first record (inclusive)
    pub start: usize,
    /// Offset past the last record (exclusive)
    pub end: usize,
    /// Total records in the source
    pub total: usize,
    pub records: BatchRecords<'a, S>,
}

impl<'a, S: RecordSource> Batch<'a, S> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl<'a, S: RecordSource> fmt::Debug for Batch<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("total", &self.total)
            .finish()
    }
}

/// Lazy iterator over the batches of a source
pub struct Batches<'a, S: RecordSource> {
    source: &'a S,
    batch_size: BatchSize,
    total: usize,
    next_start: usize,
}

impl<'a, S: RecordSource> Batches<'a, S> {
    /// Total records across all batches
    pub fn total(&self) -> usize {
        self.total
    }
}

impl<'a, S: RecordSource> Iterator for Batches<'a, S> {
    type Item = Result<Batch<'a, S>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.total {
            return None;
        }

        let start = self.next_start;
        let Some(size) = self.batch_size.get() else {
            self.next_start = self.total;
            return Some(Ok(Batch {
                start,
                end: self.total,
                total: self.total,
                records: BatchRecords::Source(self.source),
            }));
        };

        let end = (start + size).min(self.total);
        self.next_start = end;

        Some(self.source.slice(start, end).map(|records| Batch {
            start,
            end,
            total: self.total,
            records: BatchRecords::Slice(records),
        }))
    }
}

/// Batch a record source
///
/// Counts the source once; every call starts a fresh pass.
///
/// # Errors
///
/// Propagates errors from counting the source.
///
/// # Examples
///
/// ```
/// use quarry::adapters::source::MemorySource;
/// use quarry::core::export::{batch_source, BatchSize};
/// use quarry::domain::FieldValue;
/// use std::collections::HashMap;
///
/// let records: Vec<HashMap<String, FieldValue>> = vec![HashMap::new(); 10];
/// let source = MemorySource::new("items", ["id"], records).assume_ordered();
///
/// let windows: Vec<(usize, usize)> = batch_source(&source, BatchSize::bounded(3).unwrap())
///     .unwrap()
///     .map(|batch| batch.map(|b| (b.start, b.end)))
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(windows, vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
/// ```
pub fn batch_source<S: RecordSource>(source: &S, batch_size: BatchSize) -> Result<Batches<'_, S>> {
    let total = source.count()?;
    Ok(Batches {
        source,
        batch_size,
        total,
        next_start: 0,
    })
}

/// Outcome of pushing one batch
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub start: usize,
    pub end: usize,
    /// Rows sent to the sink
    pub rows_pushed: usize,
    /// Rejected rows, indexed against the whole source
    pub row_errors: Vec<RowError>,
}

impl BatchResult {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ..Default::default()
        }
    }

    /// Record sink rejections reported relative to this batch
    pub fn add_row_errors(&mut self, errors: Vec<RowError>) {
        let start = self.start;
        self.row_errors
            .extend(errors.into_iter().map(|e| e.offset_by(start)));
    }

    pub fn failed(&self) -> usize {
        self.row_errors.len()
    }
}
