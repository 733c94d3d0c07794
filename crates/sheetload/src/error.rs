//! Error types for the sheetload library.
//!
//! Only problems with the row-type definition itself, or with the
//! infrastructure underneath an import, surface as [`SheetloadError`]. Bad
//! input data never does: it is recorded on the returned
//! [`RowCollection`](crate::RowCollection) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sheetload operations.
#[derive(Debug, Error)]
pub enum SheetloadError {
    /// The row type is missing required metadata or declares it in an
    /// unsupported shape.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no rows to read.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Error from the SQLite driver outside of a batch write.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The storage backend failed for a reason unrelated to the record being
    /// written (lost connection, malformed statement, ...).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SheetloadError {
    /// Shorthand for a [`SheetloadError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        SheetloadError::Config(message.into())
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, SheetloadError::Config(_))
    }
}

/// Result type alias for sheetload operations.
pub type Result<T> = std::result::Result<T, SheetloadError>;
