//! Error types for comparisons and report generation

use std::fmt;

/// Which of the two inputs an error or row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => write!(f, "old"),
            Side::New => write!(f, "new"),
        }
    }
}

/// Errors surfaced to the caller of a comparison
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// Both datasets have rows but no column in common
    #[error("the two files share no columns (old: {old_columns:?}, new: {new_columns:?})")]
    SchemaMismatch {
        old_columns: Vec<String>,
        new_columns: Vec<String>,
    },

    /// A key value occurs more than once within one dataset
    #[error("duplicate key '{key}' in {side} file (lines {first_line} and {line})")]
    DuplicateKey {
        side: Side,
        key: String,
        first_line: usize,
        line: usize,
    },

    /// An input has no data rows and empty inputs are configured to fail
    #[error("the {side} file contains no data rows")]
    EmptyDataset { side: Side },

    /// The CSV could not be parsed
    #[error("malformed {side} file at line {line}: {message}")]
    MalformedInput {
        side: Side,
        line: usize,
        message: String,
    },

    /// A requested key column does not exist in one of the datasets
    #[error("key column '{column}' not found in {side} file")]
    MissingKeyColumn { side: Side, column: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook writer failed
    #[error("report error: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for comparison results.
pub type Result<T> = std::result::Result<T, CompareError>;
