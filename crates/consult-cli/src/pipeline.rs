//! Consultation quality pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: Decompress, decode and read both source tables as text
//! 2. **Normalize**: Trim identifiers, map sentinels and blanks to missing
//! 3. **Coerce**: Type identifiers, dates and categoricals
//! 4. **Validate**: Flag every consultation whose patient exists
//! 5. **Aggregate**: Share of valid consultations per month
//! 6. **Persist**: Write the two cleaned tables and the aggregate as Parquet
//!
//! Each stage takes the output of the previous stage and returns typed results.
//! Any stage error aborts the run; nothing is retried.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use consult_ingest::{IngestError, SourceTables, load_sources};
use consult_model::{ErrorCategory, MonthlyProportion, SchemaError};
use consult_output::{OutputError, OutputPaths, write_outputs};
use consult_transform::{
    JoinOutcome, MonthlyAggregate, TransformError, aggregate_monthly, coerce_consultations,
    coerce_patients, join_patients, normalize_consultations, normalize_patients,
};

/// Patients extract, gzip compressed.
pub const PATIENTS_SOURCE: &str = "patients.csv.gz";
/// Consultations extract, a zip archive holding one CSV.
pub const CONSULTATIONS_SOURCE: &str = "consultations.csv.zip";

/// Where the pipeline reads and writes. Resolved once from the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub inputs_dir: PathBuf,
    pub outputs_dir: PathBuf,
}

impl PipelineConfig {
    /// The fixed `inputs/` and `outputs/` layout under a project root.
    pub fn from_root(root: &Path) -> Self {
        Self {
            inputs_dir: root.join("inputs"),
            outputs_dir: root.join("outputs"),
        }
    }

    pub fn patients_path(&self) -> PathBuf {
        self.inputs_dir.join(PATIENTS_SOURCE)
    }

    pub fn consultations_path(&self) -> PathBuf {
        self.inputs_dir.join(CONSULTATIONS_SOURCE)
    }
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Read both source files into text-only tables with their schemas checked.
pub fn ingest(config: &PipelineConfig) -> Result<SourceTables> {
    let _span = info_span!("ingest").entered();
    info!("Step 1 - loading source files");
    load_sources(&config.patients_path(), &config.consultations_path())
        .context("load source files")
}

// ============================================================================
// Stages 2-3: Normalize and coerce
// ============================================================================

/// Cleaned, typed tables ready to be joined and persisted.
#[derive(Debug)]
pub struct CleanResult {
    pub patients: DataFrame,
    pub consultations: DataFrame,
    /// Sentinel or blank values mapped to missing, both tables.
    pub cleared: usize,
    /// Dates that were present as text but failed to parse, both tables.
    pub unparsed_dates: usize,
}

/// Normalize missing values, then coerce every required column to its type.
pub fn clean(sources: SourceTables) -> Result<CleanResult> {
    let SourceTables {
        mut patients,
        mut consultations,
    } = sources;

    let cleared = {
        let _span = info_span!("normalize").entered();
        info!("Step 2 - normalizing missing values");
        let patient_report = normalize_patients(&mut patients).context("normalize patients")?;
        let consultation_report =
            normalize_consultations(&mut consultations).context("normalize consultations")?;
        info!(
            patients = patient_report.total(),
            consultations = consultation_report.total(),
            "values mapped to missing"
        );
        patient_report.total() + consultation_report.total()
    };

    let unparsed_dates = {
        let _span = info_span!("coerce").entered();
        info!("Step 3 - coercing column types");
        let patient_report = coerce_patients(&mut patients).context("coerce patient columns")?;
        let consultation_report = coerce_consultations(&mut consultations)
            .context("coerce consultation columns")?;
        patient_report
            .dates
            .iter()
            .chain(&consultation_report.dates)
            .map(|date| date.introduced)
            .sum::<usize>()
    };

    Ok(CleanResult {
        patients,
        consultations,
        cleared,
        unparsed_dates,
    })
}

// ============================================================================
// Stage 4: Validate
// ============================================================================

/// Left join consultations to patients and flag referential validity.
pub fn validate(cleaned: &CleanResult) -> Result<JoinOutcome> {
    let _span = info_span!("validate").entered();
    info!("Step 4 - checking patient references");
    let outcome = join_patients(&cleaned.consultations, &cleaned.patients)
        .context("join consultations to patients")?;
    info!(
        matched = outcome.matched,
        orphans = outcome.orphans,
        "patient references checked"
    );
    Ok(outcome)
}

// ============================================================================
// Stage 5: Aggregate
// ============================================================================

/// Compute the per-month proportion of consultations with a valid patient.
pub fn aggregate(outcome: &JoinOutcome) -> Result<MonthlyAggregate> {
    let _span = info_span!("aggregate").entered();
    info!("Step 5 - computing monthly proportions");
    let aggregate = aggregate_monthly(&outcome.joined).context("aggregate by month")?;
    info!(months = aggregate.months.len(), "monthly proportions computed");
    Ok(aggregate)
}

// ============================================================================
// Stage 6: Persist
// ============================================================================

/// Write the cleaned tables and the aggregate into the output directory.
pub fn persist(
    config: &PipelineConfig,
    cleaned: &mut CleanResult,
    aggregate: &mut MonthlyAggregate,
) -> Result<OutputPaths> {
    let _span = info_span!("persist").entered();
    info!("Step 6 - writing outputs");
    let paths = write_outputs(
        &config.outputs_dir,
        &mut cleaned.patients,
        &mut cleaned.consultations,
        &mut aggregate.frame,
    )
    .with_context(|| format!("write outputs to {}", config.outputs_dir.display()))?;
    for path in paths.iter() {
        info!(path = %path.display(), "output saved");
    }
    Ok(paths)
}

// ============================================================================
// Full run
// ============================================================================

/// Outcome of a completed run, used for the printed summary.
#[derive(Debug)]
pub struct RunResult {
    pub months: Vec<MonthlyProportion>,
    pub outputs: OutputPaths,
    pub patients: usize,
    pub consultations: usize,
    pub orphans: usize,
    pub undated: usize,
    /// Sentinel or blank values mapped to missing, both tables.
    pub cleared: usize,
    /// Dates present as text that failed to parse, both tables.
    pub unparsed_dates: usize,
}

/// Run every stage in order.
pub fn run(config: &PipelineConfig) -> Result<RunResult> {
    let started = Instant::now();
    info!("===== processing started =====");

    let sources = ingest(config)?;
    let mut cleaned = clean(sources)?;
    let outcome = validate(&cleaned)?;
    let mut aggregate = aggregate(&outcome)?;
    let outputs = persist(config, &mut cleaned, &mut aggregate)?;

    info!(
        elapsed_ms = started.elapsed().as_millis(),
        "===== processing finished ====="
    );
    Ok(RunResult {
        patients: cleaned.patients.height(),
        consultations: cleaned.consultations.height(),
        orphans: outcome.orphans,
        undated: aggregate.undated,
        cleared: cleaned.cleared,
        unparsed_dates: cleaned.unparsed_dates,
        months: aggregate.months,
        outputs,
    })
}

/// Category of the first typed pipeline error in the chain, if any.
pub fn error_category(error: &anyhow::Error) -> Option<ErrorCategory> {
    error.chain().find_map(|cause| {
        if let Some(error) = cause.downcast_ref::<IngestError>() {
            Some(error.category())
        } else if let Some(error) = cause.downcast_ref::<TransformError>() {
            Some(error.category())
        } else if let Some(error) = cause.downcast_ref::<OutputError>() {
            Some(error.category())
        } else {
            cause.downcast_ref::<SchemaError>().map(SchemaError::category)
        }
    })
}
