//! CSV result materialization.
//!
//! Result endpoints answer with RFC 4180 CSV whose first record is the header.
//! [`ResultSet`] holds the decoded rows in order; every row has exactly as many
//! fields as there are columns.

use crate::error::{Error, ErrorKind, Result};

/// Ordered rows with named columns, parsed from one CSV result partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultSet {
    /// Decode a response body as UTF-8 and parse it.
    pub fn from_bytes(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)?;
        Self::from_csv(text)
    }

    /// Parse CSV text. An empty (or whitespace-only) body is an empty result
    /// set with no columns.
    pub fn from_csv(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(Error::new(ErrorKind::DataFormat(format!(
                "duplicate column {:?} in result header",
                duplicate
            ))));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in body order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` in the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Rows as name-addressable records.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |values| Record {
            columns: &self.columns,
            values,
        })
    }

    /// Take the rows, dropping the header.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// One row of a [`ResultSet`], addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    values: &'a [String],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index).map(String::as_str)
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let (columns, values) = (self.columns, self.values);
        columns
            .iter()
            .map(String::as_str)
            .zip(values.iter().map(String::as_str))
    }
}
