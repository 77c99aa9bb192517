//! Column-level cleaning rules.

use polars::prelude::*;
use tracing::debug;

use consult_model::columns::{
    BIRTH_DATE, CONSULTATION_ID, DATE_CONSULTATION, DIAGNOSTIC, GENDER, PATIENT_ID,
};
use consult_model::{CONSULTATIONS, PATIENTS};

use crate::error::Result;
use crate::frame::{require_columns, text_column};

/// Placeholders written by the source system instead of a date.
const DATE_SENTINELS: &[&str] = &["not_a_date", "N/ A"];

/// How one column is cleaned before typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    pub column: &'static str,
    /// Trim surrounding whitespace; a value left empty becomes missing.
    pub trim: bool,
    /// Literal values that mean "no value".
    pub sentinels: &'static [&'static str],
}

impl ColumnRule {
    const fn trimmed(column: &'static str) -> Self {
        Self {
            column,
            trim: true,
            sentinels: &[],
        }
    }

    const fn sentinels(column: &'static str, sentinels: &'static [&'static str]) -> Self {
        Self {
            column,
            trim: false,
            sentinels,
        }
    }

    /// Cleans a present value; `None` means the value is missing.
    pub fn apply<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let value = if self.trim { raw.trim() } else { raw };
        if self.trim && value.is_empty() {
            return None;
        }
        if self.sentinels.contains(&value) {
            return None;
        }
        Some(value)
    }
}

pub const PATIENT_RULES: &[ColumnRule] = &[
    ColumnRule::trimmed(PATIENT_ID),
    ColumnRule::sentinels(BIRTH_DATE, DATE_SENTINELS),
    ColumnRule::sentinels(GENDER, &["unknown"]),
];

pub const CONSULTATION_RULES: &[ColumnRule] = &[
    ColumnRule::trimmed(CONSULTATION_ID),
    ColumnRule::sentinels(DATE_CONSULTATION, DATE_SENTINELS),
    ColumnRule::sentinels(DIAGNOSTIC, &["nnull"]),
];

/// Number of values each rule turned into missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub cleared: Vec<(&'static str, usize)>,
}

impl NormalizationReport {
    pub fn cleared_in(&self, column: &str) -> usize {
        self.cleared
            .iter()
            .find(|(name, _)| *name == column)
            .map_or(0, |(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.cleared.iter().map(|(_, count)| count).sum()
    }
}

/// Applies the patients cleaning rules in place.
pub fn normalize_patients(df: &mut DataFrame) -> Result<NormalizationReport> {
    normalize_table(df, PATIENTS.name, PATIENT_RULES)
}

/// Applies the consultations cleaning rules in place.
pub fn normalize_consultations(df: &mut DataFrame) -> Result<NormalizationReport> {
    normalize_table(df, CONSULTATIONS.name, CONSULTATION_RULES)
}

/// Applies `rules` to their columns; other columns are left untouched.
pub fn normalize_table(
    df: &mut DataFrame,
    table: &str,
    rules: &[ColumnRule],
) -> Result<NormalizationReport> {
    let names: Vec<&str> = rules.iter().map(|rule| rule.column).collect();
    require_columns(df, table, &names)?;

    let mut report = NormalizationReport::default();
    for rule in rules {
        let cleared = apply_rule(df, rule)?;
        debug!(table, column = rule.column, cleared, "normalized column");
        report.cleared.push((rule.column, cleared));
    }
    Ok(report)
}

fn apply_rule(df: &mut DataFrame, rule: &ColumnRule) -> Result<usize> {
    let values = text_column(df, rule.column)?;

    let mut builder = StringChunkedBuilder::new(rule.column.into(), values.len());
    let mut cleared = 0;
    for value in values.into_iter() {
        match value.map(|raw| rule.apply(raw)) {
            Some(Some(clean)) => builder.append_value(clean),
            Some(None) => {
                cleared += 1;
                builder.append_null();
            }
            None => builder.append_null(),
        }
    }

    df.with_column(builder.finish().into_column())?;
    Ok(cleared)
}
