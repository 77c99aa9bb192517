//! Error types for output generation.

use std::path::PathBuf;

use consult_model::ErrorCategory;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    /// Output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be opened for writing.
    #[error("failed to create {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parquet serialization or the write itself failed.
    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl OutputError {
    /// Every output failure is an I/O failure.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::Io
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
