//! Data source abstraction and metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tabular data source addressed by 1-based physical row number.
///
/// Row 1 is the first physical row of the source, usually a header.
pub trait TabularSource {
    /// Cell values of physical row `n`, or `None` if the row does not exist.
    fn row(&self, n: usize) -> Option<Vec<String>>;

    /// Number of the last physical row (0 for an empty source).
    fn last_row(&self) -> usize;
}

/// Metadata about a source file that has been read.
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
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of physical rows, header included.
    pub row_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
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
            read_at: Utc::now(),
        }
    }
}

/// In-memory sheet holding every physical row, header included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Create a sheet from physical rows; `rows[0]` becomes row 1.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Create a sheet with a header row followed by data rows.
    ///
    /// ```
    /// use sheetload::{Sheet, TabularSource};
    ///
    /// let sheet = Sheet::with_header(["username", "email"], [["alice", "a@x.com"]]);
    /// assert_eq!(sheet.last_row(), 2);
    /// assert_eq!(sheet.row(2).unwrap()[0], "alice");
    /// ```
    pub fn with_header<H, R, C, S>(header: H, rows: R) -> Self
    where
        H: IntoIterator<Item = S>,
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec![header.into_iter().map(Into::into).collect::<Vec<_>>()];
        all.extend(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect()),
        );
        Self { rows: all }
    }

    /// Append a physical row.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Number of physical rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the sheet has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a specific cell value (1-based row, 0-based column).
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        row.checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .and_then(|r| r.get(col).map(|s| s.as_str()))
    }
}

impl TabularSource for Sheet {
    fn row(&self, n: usize) -> Option<Vec<String>> {
        n.checked_sub(1).and_then(|i| self.rows.get(i)).cloned()
    }

    fn last_row(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_is_one_based() {
        let sheet = Sheet::with_header(["a", "b"], [["1", "2"], ["3", "4"]]);
        assert_eq!(sheet.last_row(), 3);
        assert_eq!(sheet.row(0), None);
        assert_eq!(sheet.row(1), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(sheet.get(3, 1), Some("4"));
        assert_eq!(sheet.row(4), None);
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = Sheet::default();
        assert!(sheet.is_empty());
        assert_eq!(sheet.last_row(), 0);
    }
}
