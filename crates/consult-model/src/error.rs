use std::fmt;

use thiserror::Error;

/// Coarse classification of fatal pipeline failures.
///
/// Per-value coercion problems never produce an error; they become missing
/// values and are only reported as counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Source unreadable or undecompressable, or destination unwritable.
    Io,
    /// An expected column is absent.
    Schema,
    /// Structurally malformed tabular input.
    Parse,
    /// Unexpected failure inside the dataframe engine.
    Frame,
}

impl ErrorCategory {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Io => "IOError",
            Self::Schema => "SchemaError",
            Self::Parse => "ParseError",
            Self::Frame => "FrameError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One or more required columns are absent from a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("table '{table}' is missing required column(s): {}", .columns.join(", "))]
pub struct SchemaError {
    pub table: String,
    pub columns: Vec<String>,
}

impl SchemaError {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::Schema
    }
}
