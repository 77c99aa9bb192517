//! Typed coercion of normalized columns.
//!
//! A value that cannot be coerced becomes missing; coercion itself never
//! fails on a value.

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::info;

use consult_model::{CONSULTATIONS, ColumnKind, PATIENTS, TableSchema};

use crate::error::Result;
use crate::frame::{categorical_dtype, null_count, require_columns, text_column};

use super::datetime::{CONSULTATION_DATE_FORMAT, DatePolicy};

/// Missing-value counts for one coerced date column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCoercion {
    pub column: &'static str,
    /// Missing values after coercion.
    pub missing: usize,
    /// Values present before coercion that failed to parse.
    pub introduced: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionReport {
    pub dates: Vec<DateCoercion>,
}

impl CoercionReport {
    pub fn date(&self, column: &str) -> Option<&DateCoercion> {
        self.dates.iter().find(|d| d.column == column)
    }
}

/// Types the patients table: text identifier, free-form birth date,
/// categorical gender.
pub fn coerce_patients(df: &mut DataFrame) -> Result<CoercionReport> {
    coerce_table(df, &PATIENTS, DatePolicy::FreeForm)
}

/// Types the consultations table: text identifiers, strict day/month/year
/// consultation date, categorical diagnostic.
pub fn coerce_consultations(df: &mut DataFrame) -> Result<CoercionReport> {
    coerce_table(df, &CONSULTATIONS, DatePolicy::Exact(CONSULTATION_DATE_FORMAT))
}

fn coerce_table(
    df: &mut DataFrame,
    schema: &TableSchema,
    dates: DatePolicy,
) -> Result<CoercionReport> {
    let names: Vec<&str> = schema.column_names().collect();
    require_columns(df, schema.name, &names)?;

    let mut report = CoercionReport::default();
    for spec in schema.columns {
        match spec.kind {
            ColumnKind::Identifier => {
                let ids = text_column(df, spec.name)?;
                df.with_column(ids.into_column())?;
            }
            ColumnKind::Date => {
                let coercion = coerce_date_column(df, spec.name, dates)?;
                info!(
                    table = schema.name,
                    column = coercion.column,
                    missing = coercion.missing,
                    unparseable = coercion.introduced,
                    "date coercion"
                );
                report.dates.push(coercion);
            }
            ColumnKind::Categorical => {
                let categories = df.column(spec.name)?.cast(&categorical_dtype())?;
                df.with_column(categories)?;
            }
        }
    }
    Ok(report)
}

fn coerce_date_column(
    df: &mut DataFrame,
    column: &'static str,
    policy: DatePolicy,
) -> Result<DateCoercion> {
    let before = null_count(df, column)?;
    let values = text_column(df, column)?;

    let dates: Vec<Option<NaiveDate>> = values
        .into_iter()
        .map(|value| value.and_then(|raw| policy.parse(raw)))
        .collect();
    df.with_column(Series::new(column.into(), dates).into_column())?;

    let missing = null_count(df, column)?;
    Ok(DateCoercion {
        column,
        missing,
        introduced: missing - before,
    })
}
