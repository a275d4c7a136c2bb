use std::path::PathBuf;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error type
// ---------------------------------------------------------------------------

/// Every failure the load → query pipeline can report.
///
/// Parse errors from the format readers are wrapped as-is so the caller sees
/// the underlying engine's message.
#[derive(Error, Debug)]
pub enum StatError {
    /// No regular file at the given path when the handle was built.
    #[error("{} not found!", .path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// The file parsed but does not have a tabular shape.
    #[error("Malformed table: {message}")]
    Malformed { message: String },

    #[error("Column name is empty")]
    EmptyColumnName,

    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("Column '{column}' has non-numeric type {data_type}")]
    NonNumericColumn { column: String, data_type: DataType },
}

pub type Result<T> = std::result::Result<T, StatError>;

impl StatError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
