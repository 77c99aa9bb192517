//! Loading of both source tables.

use std::path::Path;

use polars::prelude::{DataFrame, PlSmallStr};
use tracing::info;

use consult_model::{CONSULTATIONS, PATIENTS};

use crate::csv::read_source_table;
use crate::error::Result;

/// Raw, untyped source tables.
#[derive(Debug)]
pub struct SourceTables {
    pub patients: DataFrame,
    pub consultations: DataFrame,
}

/// Loads the patients and consultations sources.
///
/// No row is dropped here. Fails on the first unreadable, undecompressable,
/// malformed, or incomplete source.
pub fn load_sources(patients_path: &Path, consultations_path: &Path) -> Result<SourceTables> {
    let patients = read_source_table(patients_path, &PATIENTS)?;
    let consultations = read_source_table(consultations_path, &CONSULTATIONS)?;

    info!(
        patients = patients.height(),
        consultations = consultations.height(),
        "sources loaded"
    );
    info!("patients columns: {:?}", column_list(&patients));
    info!("consultations columns: {:?}", column_list(&consultations));

    Ok(SourceTables {
        patients,
        consultations,
    })
}

fn column_list(df: &DataFrame) -> Vec<&str> {
    df.get_column_names()
        .into_iter()
        .map(PlSmallStr::as_str)
        .collect()
}
