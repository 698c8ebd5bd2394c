//! Untyped view of the results log.
//!
//! A [`RecordTable`] keeps every column of the file, including columns this
//! crate does not know about, so rewriting the log never drops data.

use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

impl RecordTable {
    pub fn with_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Read a log file. A missing file is `Ok(None)`.
    ///
    /// Short rows are padded with empty cells; extra cells beyond the header
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Csv`] when the file exists
    /// but cannot be read.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(StoreError::io("open", path, error)),
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);
        let csv_error = |source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut records = reader.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record.map_err(csv_error)?.iter().map(normalize_header).collect(),
            None => return Ok(Some(Self::default())),
        };
        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(csv_error)?;
            if record.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            let row = (0..headers.len())
                .map(|idx| record.get(idx).unwrap_or("").to_string())
                .collect();
            rows.push(row);
        }
        Ok(Some(Self { headers, rows }))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Append every column in `columns` not yet in the header, filling
    /// existing rows with empty strings. Returns the added column names.
    pub fn widen<S: AsRef<str>>(&mut self, columns: &[S]) -> Vec<String> {
        let mut added = Vec::new();
        for column in columns {
            let column = column.as_ref();
            if self.column_index(column).is_none() {
                self.headers.push(column.to_string());
                added.push(column.to_string());
            }
        }
        if !added.is_empty() {
            let width = self.headers.len();
            for row in &mut self.rows {
                row.resize(width, String::new());
            }
        }
        added
    }

    /// Append a row given as `(column, value)` pairs. Header columns without
    /// a value get an empty string; pairs naming unknown columns are ignored,
    /// so callers widen first.
    pub fn push_row(&mut self, values: &[(&str, String)]) {
        let row = self
            .headers
            .iter()
            .map(|header| {
                values
                    .iter()
                    .find(|(column, _)| column == header)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default()
            })
            .collect();
        self.rows.push(row);
    }

    pub fn value<'a>(&'a self, row: &'a [String], column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
    }

    /// Rows whose `column` equals `expected` exactly.
    pub fn filter_eq(&self, column: &str, expected: &str) -> Self {
        let rows = match self.column_index(column) {
            Some(idx) => self
                .rows
                .iter()
                .filter(|row| row.get(idx).is_some_and(|value| value == expected))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// # Errors
    ///
    /// Returns the underlying I/O error from `writer`.
    pub fn write_csv<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let mut csv = WriterBuilder::new().flexible(false).from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row)?;
        }
        csv.flush()
    }

    pub fn to_csv_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_csv(&mut buffer);
        buffer
    }
}
