//! Data quality transformations for the consultation pipeline.
//!
//! This crate holds the substantive logic of the pipeline, in stage order:
//!
//! - **normalization**: sentinel and blank values mapped to missing, then
//!   typed coercion to identifiers, dates, and categoricals
//! - **join**: consultation to patient referential validity
//! - **aggregate**: per-month share of valid consultations
//!
//! Per-value problems never fail a stage; they become missing values and are
//! reported as counts.

pub mod aggregate;
pub mod error;
pub mod frame;
pub mod join;
pub mod normalization;

pub use normalization::datetime;

// Re-export the stage entry points
pub use aggregate::{MonthlyAggregate, aggregate_monthly, monthly_proportions, proportions_frame};
pub use error::{Result, TransformError};
pub use join::{JoinOutcome, join_patients};
pub use normalization::{
    CONSULTATION_RULES, CoercionReport, ColumnRule, DateCoercion, NormalizationReport,
    PATIENT_RULES, coerce_consultations, coerce_patients, normalize_consultations,
    normalize_patients,
};
