//! Error types for the transformation stages.

use consult_model::{ErrorCategory, SchemaError};
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// A column the stage operates on is absent.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {0}")]
    Frame(#[from] PolarsError),
}

impl TransformError {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Schema(_) => ErrorCategory::Schema,
            Self::Frame(_) => ErrorCategory::Frame,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
