//! Error handling for the note screening pipeline.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for note screening operations
#[derive(Debug, thiserror::Error)]
pub enum NoteScanError {
    /// Missing or malformed keyword source; fatal, the run cannot start
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// A batch is missing a required column or carries an unsupported type
    #[error("Schema error: {0}")]
    Schema(String),

    /// Error converting between row structs and Arrow batches
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No partition artifacts were available at merge time
    #[error("Merge error: {0}")]
    Merge(String),
}

/// Result type for note screening operations
pub type Result<T> = std::result::Result<T, NoteScanError>;
