//! Shared data model for the consultation quality pipeline.
//!
//! - **schema**: the fixed column sets of the patients and consultations
//!   tables, with the semantic kind of every required column
//! - **error**: error categories and the schema violation shared by every stage
//! - **proportion**: the per-month validity aggregate

pub mod error;
pub mod proportion;
pub mod schema;

pub use error::{ErrorCategory, SchemaError};
pub use proportion::MonthlyProportion;
pub use schema::{CONSULTATIONS, ColumnKind, ColumnSpec, PATIENTS, TableSchema, columns};
