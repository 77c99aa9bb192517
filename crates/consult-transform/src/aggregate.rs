//! Monthly aggregation of referential validity.

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::info;

use consult_model::MonthlyProportion;
use consult_model::columns::{MOIS_CONSULTATION, PATIENT_VALIDE, PROPORTION_PATIENT_ID_VALIDE};

use crate::error::Result;
use crate::frame::require_columns;

/// Result of the aggregation stage.
#[derive(Debug, Clone)]
pub struct MonthlyAggregate {
    /// One entry per month present, ascending by month label.
    pub months: Vec<MonthlyProportion>,
    /// Two-column table written as the result.
    pub frame: DataFrame,
    /// Joined rows excluded because their month is missing.
    pub undated: usize,
}

/// Aggregates joined consultations into per-month validity proportions.
///
/// Rows without a month bucket are dropped before grouping; they count in no
/// month's denominator.
pub fn aggregate_monthly(joined: &DataFrame) -> Result<MonthlyAggregate> {
    require_columns(joined, "joined", &[MOIS_CONSULTATION, PATIENT_VALIDE])?;

    let dated = joined
        .clone()
        .lazy()
        .filter(col(MOIS_CONSULTATION).is_not_null())
        .collect()?;
    let undated = joined.height() - dated.height();
    if undated > 0 {
        info!(undated, "excluded consultations without a valid date");
    }

    let months = monthly_proportions(&dated)?;
    let frame = proportions_frame(&months)?;
    info!(months = months.len(), "monthly aggregation complete");

    Ok(MonthlyAggregate {
        months,
        frame,
        undated,
    })
}

/// Groups rows by month and counts valid and total consultations.
///
/// Rows with a missing month or flag are skipped.
pub fn monthly_proportions(joined: &DataFrame) -> Result<Vec<MonthlyProportion>> {
    let months = joined.column(MOIS_CONSULTATION)?.str()?;
    let flags = joined.column(PATIENT_VALIDE)?.bool()?;

    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (month, flag) in months.into_iter().zip(flags) {
        let (Some(month), Some(flag)) = (month, flag) else {
            continue;
        };
        let entry = counts.entry(month).or_insert((0, 0));
        if flag {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(month, (valid, total))| MonthlyProportion::new(month, valid, total))
        .collect())
}

/// Builds the `mois_consultation` / `proportion_patient_id_valide` table.
pub fn proportions_frame(months: &[MonthlyProportion]) -> Result<DataFrame> {
    let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    let proportions: Vec<f64> = months.iter().map(MonthlyProportion::proportion).collect();

    Ok(DataFrame::new(vec![
        Column::new(MOIS_CONSULTATION.into(), labels),
        Column::new(PROPORTION_PATIENT_ID_VALIDE.into(), proportions),
    ])?)
}
