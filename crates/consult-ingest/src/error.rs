//! Error types for source ingestion.

use std::path::PathBuf;

use consult_model::{ErrorCategory, SchemaError};
use thiserror::Error;

/// Errors that can occur while loading a source table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compressed stream or archive could not be decoded.
    #[error("failed to decompress {path}: {message}")]
    Decompress { path: PathBuf, message: String },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    // === Schema Errors ===
    /// A required column is absent from the header.
    #[error("{path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

impl IngestError {
    /// Classification used when reporting a fatal failure.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. } | Self::FileRead { .. } | Self::Decompress { .. } => {
                ErrorCategory::Io
            }
            Self::CsvParse { .. } => ErrorCategory::Parse,
            Self::Schema { .. } => ErrorCategory::Schema,
        }
    }

    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("inputs/patients.csv.gz"),
        };
        assert_eq!(
            err.to_string(),
            "source file not found: inputs/patients.csv.gz"
        );
    }

    #[test]
    fn test_error_categories() {
        let path = PathBuf::from("x.csv");
        let decompress = IngestError::Decompress {
            path: path.clone(),
            message: "bad header".to_string(),
        };
        let parse = IngestError::CsvParse {
            path: path.clone(),
            message: "ragged".to_string(),
        };
        let schema = IngestError::Schema {
            path,
            source: SchemaError::new("patients", vec!["gender".to_string()]),
        };
        assert_eq!(decompress.category(), ErrorCategory::Io);
        assert_eq!(parse.category(), ErrorCategory::Parse);
        assert_eq!(schema.category(), ErrorCategory::Schema);
    }

    #[test]
    fn test_not_found_io_error_maps_to_file_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = IngestError::from_io(std::path::Path::new("a.gz"), io);
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
