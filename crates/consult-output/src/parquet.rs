//! Parquet writers.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, ParquetWriter};
use tracing::info;

use crate::error::{OutputError, Result};

pub const PATIENTS_FILE: &str = "patients.parquet";
pub const CONSULTATIONS_FILE: &str = "consultations.parquet";
pub const PROPORTIONS_FILE: &str = "resultat_proportion.parquet";

/// Locations of the three written files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub patients: PathBuf,
    pub consultations: PathBuf,
    pub proportions: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            patients: output_dir.join(PATIENTS_FILE),
            consultations: output_dir.join(CONSULTATIONS_FILE),
            proportions: output_dir.join(PROPORTIONS_FILE),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.patients, &self.consultations, &self.proportions]
            .into_iter()
            .map(PathBuf::as_path)
    }
}

/// Writes the three result tables into `output_dir`, creating it if needed.
pub fn write_outputs(
    output_dir: &Path,
    patients: &mut DataFrame,
    consultations: &mut DataFrame,
    proportions: &mut DataFrame,
) -> Result<OutputPaths> {
    std::fs::create_dir_all(output_dir).map_err(|source| OutputError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let paths = OutputPaths::in_dir(output_dir);
    write_parquet(patients, &paths.patients)?;
    write_parquet(consultations, &paths.consultations)?;
    write_parquet(proportions, &paths.proportions)?;

    info!(output_dir = %output_dir.display(), "outputs written");
    Ok(paths)
}

/// Writes one DataFrame as a Parquet file, returning its size in bytes.
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<u64> {
    let file = File::create(path).map_err(|source| OutputError::CreateFile {
        path: path.to_path_buf(),
        source,
    })?;

    let size = ParquetWriter::new(BufWriter::new(file))
        .finish(df)
        .map_err(|e| OutputError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(path = %path.display(), rows = df.height(), bytes = size, "wrote parquet");
    Ok(size)
}
