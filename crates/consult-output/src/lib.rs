//! Output generation.
//!
//! Writes the cleaned patients and consultations tables and the monthly
//! validity result as Parquet files, keeping date and categorical column
//! types. No row-index column is written.
//!
//! A failed write is not cleaned up and may leave a truncated file behind.

mod error;
mod parquet;

pub use error::{OutputError, Result};
pub use parquet::{
    CONSULTATIONS_FILE, OutputPaths, PATIENTS_FILE, PROPORTIONS_FILE, write_outputs,
    write_parquet,
};
