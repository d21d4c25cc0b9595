//! Keyed tables loaded from delimited text.
//!
//! A [`Table`] maps the value of one designated key column to the full
//! [`Row`] it came from. Rows keep every column of the source record, in
//! header order, so a GDP row doubles as a `year → value` series.
//!
//! Loading follows last-write-wins for duplicate key values: the later row
//! replaces the earlier one but keeps the position where the key first
//! appeared, which keeps iteration order deterministic.

use std::{collections::HashMap, path::Path, sync::Arc};

use log::{debug, info};

use crate::{
    error::{ReconcileError, Result},
    io_utils::{self, CsvFormat, csv_error},
};

/// One record, addressable by column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<String>,
}

impl Row {
    /// Builds a row for `columns`. Short records are padded with empty values
    /// and surplus trailing fields are dropped so every row of a table shares
    /// one column set.
    pub fn new(columns: Arc<Vec<String>>, mut values: Vec<String>) -> Self {
        values.resize(columns.len(), String::new());
        Self { columns, values }
    }

    /// Value of `column`. A header that repeats a name resolves to its last
    /// occurrence.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .rposition(|name| name == column)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn require(&self, column: &str) -> Result<&str> {
        self.get(column)
            .ok_or_else(|| ReconcileError::missing_column(column, "row"))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    key_column: String,
    columns: Arc<Vec<String>>,
    rows: Vec<(String, Row)>,
    positions: HashMap<String, usize>,
}

impl Table {
    pub fn new(key_column: &str, columns: Vec<String>) -> Result<Self> {
        if !columns.iter().any(|c| c == key_column) {
            return Err(ReconcileError::missing_column(key_column, "header"));
        }
        Ok(Self {
            key_column: key_column.to_string(),
            columns: Arc::new(columns),
            rows: Vec::new(),
            positions: HashMap::new(),
        })
    }

    /// Adds a raw record; returns `true` when it replaced an existing key.
    pub fn insert(&mut self, values: Vec<String>) -> bool {
        let row = Row::new(Arc::clone(&self.columns), values);
        let key = row.get(&self.key_column).unwrap_or_default().to_string();
        match self.positions.get(&key) {
            Some(&idx) => {
                self.rows[idx].1 = row;
                true
            }
            None => {
                self.positions.insert(key.clone(), self.rows.len());
                self.rows.push((key, row));
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Row> {
        self.positions.get(key).map(|&idx| &self.rows[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.rows.iter().map(|(key, row)| (key.as_str(), row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads `path` into a [`Table`] keyed by `key_column`.
pub fn load_table(path: &Path, key_column: &str, delimiter: u8, quote: u8) -> Result<Table> {
    load_table_with(path, key_column, &CsvFormat::new(delimiter, quote))
}

pub fn load_table_with(path: &Path, key_column: &str, format: &CsvFormat) -> Result<Table> {
    let mut reader = io_utils::open_csv_reader_from_path(path, format, true)?;
    let headers = io_utils::reader_headers(&mut reader, path, format.encoding)?;
    let mut table = Table::new(key_column, headers).map_err(|_| {
        ReconcileError::missing_column(key_column, &format!("header of {path:?}"))
    })?;

    let mut replaced = 0usize;
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.map_err(|err| csv_error(err, path, &format!("reading row {}", row_idx + 2)))?;
        let decoded = io_utils::decode_record(&record, format.encoding)?;
        if table.insert(decoded) {
            replaced += 1;
        }
    }
    if replaced > 0 {
        debug!("{replaced} duplicate '{key_column}' value(s) in {path:?} replaced earlier rows");
    }
    info!(
        "Loaded {} row(s) keyed by '{}' from {:?}",
        table.len(),
        key_column,
        path
    );
    Ok(table)
}

/// Reads a headerless file as raw records.
pub fn load_records(path: &Path, format: &CsvFormat) -> Result<Vec<Vec<String>>> {
    let mut reader = io_utils::open_csv_reader_from_path(path, format, false)?;
    let mut records = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.map_err(|err| csv_error(err, path, &format!("reading row {}", row_idx + 1)))?;
        records.push(io_utils::decode_record(&record, format.encoding)?);
    }
    debug!("Read {} headerless record(s) from {:?}", records.len(), path);
    Ok(records)
}
