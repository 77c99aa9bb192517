//! Referential validation of consultations against patients.
//!
//! Every consultation yields exactly one joined row. Membership is checked
//! against the set of known patient identifiers, so duplicated identifiers on
//! the patient side cannot fan a consultation out; they are only reported.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{info, warn};

use consult_model::columns::{DATE_CONSULTATION, MOIS_CONSULTATION, PATIENT_ID, PATIENT_VALIDE};
use consult_model::{CONSULTATIONS, PATIENTS};

use crate::error::Result;
use crate::frame::{require_columns, text_column};
use crate::normalization::datetime::month_bucket;

/// Consultations augmented with `patient_valide` and `mois_consultation`.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub joined: DataFrame,
    /// Consultations whose patient is known.
    pub matched: usize,
    /// Consultations whose patient is missing or unknown.
    pub orphans: usize,
    /// Distinct patient identifiers appearing more than once.
    pub duplicate_patient_ids: usize,
}

/// Flags each consultation with whether its `patient_id` exists in `patients`.
///
/// `consultations` must already be coerced: `date_consultation` is read as a
/// date column to derive the month bucket.
pub fn join_patients(consultations: &DataFrame, patients: &DataFrame) -> Result<JoinOutcome> {
    require_columns(patients, PATIENTS.name, &[PATIENT_ID])?;
    require_columns(consultations, CONSULTATIONS.name, &[PATIENT_ID, DATE_CONSULTATION])?;

    let patient_ids = text_column(patients, PATIENT_ID)?;
    let mut known: HashSet<&str> = HashSet::with_capacity(patient_ids.len());
    let mut duplicated: HashSet<&str> = HashSet::new();
    for id in patient_ids.into_iter().flatten() {
        if !known.insert(id) {
            duplicated.insert(id);
        }
    }
    if !duplicated.is_empty() {
        warn!(
            duplicates = duplicated.len(),
            "patient_id is not unique in patients; consultations are matched by membership"
        );
    }

    let references = text_column(consultations, PATIENT_ID)?;
    let valid: Vec<bool> = references
        .into_iter()
        .map(|reference| reference.is_some_and(|id| known.contains(id)))
        .collect();
    let matched = valid.iter().filter(|flag| **flag).count();
    let orphans = valid.len() - matched;

    let months: Vec<Option<String>> = consultations
        .column(DATE_CONSULTATION)?
        .date()?
        .as_date_iter()
        .map(|date| date.map(month_bucket))
        .collect();

    let mut joined = consultations.clone();
    joined.with_column(Column::new(PATIENT_VALIDE.into(), valid))?;
    joined.with_column(Column::new(MOIS_CONSULTATION.into(), months))?;

    info!(matched, orphans, "joined consultations to patients");

    Ok(JoinOutcome {
        joined,
        matched,
        orphans,
        duplicate_patient_ids: duplicated.len(),
    })
}
