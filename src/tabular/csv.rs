//! Delimited-text row source.
//!
//! Rules:
//!
//! - Input must have a header row; field mapping happens by header name.
//! - The default delimiter is `;` (the upstream feeds are semicolon-separated);
//!   `*_with_delimiter` constructors accept any single-byte delimiter.
//! - Rows shorter than the header are accepted; missing cells read as `""`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ConversionError, ConversionResult};
use crate::tabular::RowSource;
use crate::types::RawRow;

/// Default cell delimiter.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Streaming row source over delimited text.
pub struct CsvRowReader<R: Read> {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<R>,
    next_index: usize,
}

impl<R: Read> std::fmt::Debug for CsvRowReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRowReader")
            .field("headers", &self.headers)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl CsvRowReader<File> {
    /// Open a semicolon-delimited file.
    pub fn from_path(path: impl AsRef<Path>) -> ConversionResult<Self> {
        Self::from_path_with_delimiter(path, DEFAULT_DELIMITER)
    }

    /// Open a delimited file with an explicit delimiter.
    pub fn from_path_with_delimiter(
        path: impl AsRef<Path>,
        delimiter: u8,
    ) -> ConversionResult<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)?;
        Self::from_csv_reader(reader)
    }
}

impl<R: Read> CsvRowReader<R> {
    /// Read semicolon-delimited text from any reader.
    pub fn from_reader(reader: R) -> ConversionResult<Self> {
        Self::from_reader_with_delimiter(reader, DEFAULT_DELIMITER)
    }

    /// Read delimited text from any reader with an explicit delimiter.
    pub fn from_reader_with_delimiter(reader: R, delimiter: u8) -> ConversionResult<Self> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);
        Self::from_csv_reader(rdr)
    }

    fn from_csv_reader(mut rdr: csv::Reader<R>) -> ConversionResult<Self> {
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        Ok(Self {
            headers,
            records: rdr.into_records(),
            next_index: 0,
        })
    }
}

impl<R: Read> Iterator for CsvRowReader<R> {
    type Item = Result<RawRow, ConversionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(ConversionError::Csv(e))),
        };
        self.next_index += 1;
        let values = record.iter().map(str::to_string).collect();
        Some(Ok(RawRow::new(self.next_index, values)))
    }
}

impl<R: Read> RowSource for CsvRowReader<R> {
    fn headers(&self) -> &[String] {
        &self.headers
    }
}
