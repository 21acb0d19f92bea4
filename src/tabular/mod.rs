//! Row sources: where raw tabular rows come from.
//!
//! The pipeline reads rows through the [`RowSource`] seam so the same engine
//! runs over delimited files ([`CsvRowReader`]) or rows already in memory
//! ([`MemorySource`]). A source is finite, yields rows in source order with
//! 1-based indices, and is consumed by one run; construct a new source to run
//! again.

pub mod csv;

pub use csv::CsvRowReader;

use crate::error::ConversionError;
use crate::types::RawRow;

/// A finite, ordered supply of raw rows beneath a single header row.
///
/// Cell access is positional; `headers()` carries the column names once for the
/// whole source. Row-level read failures surface as `Err` items so the pipeline
/// can abort with a fatal error mid-stream.
pub trait RowSource: Iterator<Item = Result<RawRow, ConversionError>> {
    /// Column names, in source order.
    fn headers(&self) -> &[String];
}

/// Rows already in memory, for tests and embedding.
#[derive(Debug)]
pub struct MemorySource {
    headers: Vec<String>,
    rows: std::vec::IntoIter<Vec<String>>,
    next_index: usize,
}

impl MemorySource {
    /// Create a source over `rows` with the given column names.
    pub fn new(
        headers: impl IntoIterator<Item = impl Into<String>>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows.into_iter(),
            next_index: 0,
        }
    }
}

impl Iterator for MemorySource {
    type Item = Result<RawRow, ConversionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.rows.next()?;
        self.next_index += 1;
        Some(Ok(RawRow::new(self.next_index, values)))
    }
}

impl RowSource for MemorySource {
    fn headers(&self) -> &[String] {
        &self.headers
    }
}
