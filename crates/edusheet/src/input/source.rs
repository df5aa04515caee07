//! Table model and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EdusheetError, Result};

/// Metadata about a loaded spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (xlsx, csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has just been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// An in-memory spreadsheet: ordered rows under a shared header.
///
/// Every cell is text. A missing cell is the empty string, so every row
/// is exactly as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table, padding or truncating rows to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Create a table with the given headers and no rows.
    pub fn empty(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`column_index`](Self::column_index), but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EdusheetError::MissingColumn(name.to_string()))
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Overwrite a cell. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Append a column, filling every row with `fill`. Returns its index.
    pub fn add_column(&mut self, name: String, fill: String) -> usize {
        self.headers.push(name);
        for row in &mut self.rows {
            row.push(fill.clone());
        }
        self.headers.len() - 1
    }

    /// Whether a cell counts as missing.
    pub fn is_blank(value: &str) -> bool {
        value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()], vec!["2".into(), "3".into(), "extra".into()]],
        )
    }

    #[test]
    fn test_new_normalizes_row_width() {
        let table = sample();
        assert_eq!(table.rows[0], vec!["1", ""]);
        assert_eq!(table.rows[1], vec!["2", "3"]);
    }

    #[test]
    fn test_add_column_and_set() {
        let mut table = sample();
        let idx = table.add_column("c".into(), "x".into());
        assert_eq!(idx, 2);
        table.set(1, idx, "y".into());
        assert_eq!(table.column_by_name("c"), Some(vec!["x", "y"]));
        table.set(9, 9, "ignored".into());
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_require_column() {
        let table = sample();
        assert_eq!(table.require_column("b").unwrap(), 1);
        assert!(matches!(
            table.require_column("zzz"),
            Err(EdusheetError::MissingColumn(name)) if name == "zzz"
        ));
    }
}
