//! Error taxonomy for the ingestion engine.
//!
//! Only dataset-level failures surface as [`CurError`]. Row-level problems
//! (unparsable numbers, malformed dates, ragged text rows) are absorbed where
//! they occur and never abort a scan.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by discovery, schema resolution and the format readers.
#[derive(Error, Debug)]
pub enum CurError {
    /// Discovery found no files of any supported format under the root.
    #[error("No CUR files found in {}", root.display())]
    NoDataFound { root: PathBuf },

    /// The column layout of a file could not be introspected.
    #[error("failed to read schema of {}: {reason}", path.display())]
    SchemaRead { path: PathBuf, reason: String },

    /// The build lacks the backend for the detected physical format.
    #[error("no reader available for {format} sources in this build")]
    FormatUnsupported { format: String },

    /// A domain name that is not part of the profile table.
    #[error("unknown analysis domain: {0}")]
    UnknownDomain(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[cfg(feature = "io-csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "io-parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[cfg(feature = "io-parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl CurError {
    pub(crate) fn schema_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SchemaRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CurError>;
