//! Field normalization and type coercion.
//!
//! Normalization always runs first so that coercing a sentinel-laden value
//! never has to reject it on its own.

pub mod coercion;
pub mod datetime;
pub mod rules;

pub use coercion::{CoercionReport, DateCoercion, coerce_consultations, coerce_patients};
pub use rules::{
    CONSULTATION_RULES, ColumnRule, NormalizationReport, PATIENT_RULES, normalize_consultations,
    normalize_patients, normalize_table,
};
