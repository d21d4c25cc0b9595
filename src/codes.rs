//! Crosswalks between identifier schemes.
//!
//! A [`CodeMap`] translates a plot identifier (for example the two-letter
//! ISO 3166-1 code a map renderer uses) into the data identifier a dataset is
//! keyed by (for example the World Bank's three-letter code).

use std::{collections::HashMap, path::Path};

use log::info;

use crate::{
    error::{ReconcileError, Result},
    io_utils::CsvFormat,
    table::{self, Table},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMap {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; the entry keeps the position of its first insertion.
    pub fn insert(&mut self, plot: impl Into<String>, data: impl Into<String>) {
        let plot = plot.into();
        let data = data.into();
        match self.positions.get(&plot) {
            Some(&idx) => self.entries[idx].1 = data,
            None => {
                self.positions.insert(plot.clone(), self.entries.len());
                self.entries.push((plot, data));
            }
        }
    }

    pub fn get(&self, plot: &str) -> Option<&str> {
        self.positions
            .get(plot)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(plot, _)| plot.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(plot, data)| (plot.as_str(), data.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, D: Into<String>> FromIterator<(P, D)> for CodeMap {
    fn from_iter<I: IntoIterator<Item = (P, D)>>(iter: I) -> Self {
        let mut map = CodeMap::new();
        for (plot, data) in iter {
            map.insert(plot, data);
        }
        map
    }
}

/// Maps `row[from_column] -> row[to_column]` for every row of `crosswalk`.
pub fn build_code_map(crosswalk: &Table, from_column: &str, to_column: &str) -> Result<CodeMap> {
    let mut map = CodeMap::new();
    for (key, row) in crosswalk.iter() {
        let from = row.get(from_column).ok_or_else(|| {
            ReconcileError::missing_column(from_column, &format!("crosswalk row '{key}'"))
        })?;
        let to = row.get(to_column).ok_or_else(|| {
            ReconcileError::missing_column(to_column, &format!("crosswalk row '{key}'"))
        })?;
        map.insert(from, to);
    }
    Ok(map)
}

/// Loads a crosswalk file keyed by `from_column` and builds its [`CodeMap`].
pub fn load_code_map(
    path: &Path,
    from_column: &str,
    to_column: &str,
    format: &CsvFormat,
) -> Result<CodeMap> {
    let crosswalk = table::load_table_with(path, from_column, format)?;
    let map = build_code_map(&crosswalk, from_column, to_column)?;
    info!(
        "Built {} '{}' -> '{}' code mapping(s) from {:?}",
        map.len(),
        from_column,
        to_column,
        path
    );
    Ok(map)
}
