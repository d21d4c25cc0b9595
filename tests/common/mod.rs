#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use csv_reconcile::table::Table;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Builds an in-memory table keyed by the first of `columns`.
pub fn table_of(columns: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::new(
        columns[0],
        columns.iter().map(|c| c.to_string()).collect(),
    )
    .expect("key column present");
    for row in rows {
        table.insert(row.iter().map(|v| v.to_string()).collect());
    }
    table
}

/// Scratch directory that is removed when dropped.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }
}
