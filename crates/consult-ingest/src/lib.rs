//! Source data ingestion.
//!
//! This crate turns the two raw source files into Polars DataFrames:
//!
//! - **Compression**: inferred from the file extension (`.gz`, `.zip`, plain)
//! - **Decoding**: Latin-1, one byte per character
//! - **CSV Loading**: comma separated, header row, every column read as text
//! - **Schema Check**: required columns verified before any cleaning runs
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use consult_ingest::load_sources;
//!
//! let sources = load_sources(
//!     Path::new("inputs/patients.csv.gz"),
//!     Path::new("inputs/consultations.csv.zip"),
//! )?;
//! println!("{} patients", sources.patients.height());
//! ```

mod compression;
mod csv;
mod error;
mod loader;

// === Error Types ===
pub use error::{IngestError, Result};

// === Decompression ===
pub use compression::{Compression, read_decompressed};

// === CSV Reading ===
pub use crate::csv::{decode_latin1, parse_csv_text, read_source_table};

// === Loading ===
pub use loader::{SourceTables, load_sources};
