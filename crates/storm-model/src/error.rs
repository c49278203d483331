//! Error types for the table model and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when a table invariant would be broken or config cannot load.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A column's length does not match the table height.
    #[error("column '{column}' has {found} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A row does not carry one value per column.
    #[error("row has {found} values, table has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    /// Two columns would share a name.
    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    /// Lookup of a column that does not exist.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::PipelineConfig`].
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
