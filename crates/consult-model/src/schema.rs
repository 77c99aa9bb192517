//! Explicit table schemas.
//!
//! Both source tables have a fixed set of required columns. Extra columns are
//! allowed and carried through untouched; a missing required column is a
//! [`SchemaError`] raised at load time rather than deep inside a later stage.

use crate::error::SchemaError;

/// Column names used across the pipeline.
pub mod columns {
    pub const PATIENT_ID: &str = "patient_id";
    pub const BIRTH_DATE: &str = "birth_date";
    pub const GENDER: &str = "gender";

    pub const CONSULTATION_ID: &str = "consultation_id";
    pub const DATE_CONSULTATION: &str = "date_consultation";
    pub const DIAGNOSTIC: &str = "diagnostic";

    /// Validity flag added by the join.
    pub const PATIENT_VALIDE: &str = "patient_valide";
    /// `YYYY-MM` bucket derived from the consultation date.
    pub const MOIS_CONSULTATION: &str = "mois_consultation";
    /// Per-month fraction of consultations with a known patient.
    pub const PROPORTION_PATIENT_ID_VALIDE: &str = "proportion_patient_id_valide";
}

/// Semantic type a column is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Opaque text key, never rejected.
    Identifier,
    /// Calendar date.
    Date,
    /// Low-cardinality label compared by equality only.
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// Required columns of a source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl TableSchema {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|spec| spec.name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.name == name)
    }

    /// Required columns absent from `present`, in schema order.
    pub fn missing_columns<'a, I>(&self, present: I) -> Vec<&'static str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: Vec<&str> = present.into_iter().collect();
        self.column_names()
            .filter(|name| !present.contains(name))
            .collect()
    }

    /// Fails with a [`SchemaError`] listing every absent required column.
    pub fn check_columns<'a, I>(&self, present: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let missing = self.missing_columns(present);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::new(
                self.name,
                missing.into_iter().map(String::from).collect(),
            ))
        }
    }
}

pub const PATIENTS: TableSchema = TableSchema {
    name: "patients",
    columns: &[
        ColumnSpec::new(columns::PATIENT_ID, ColumnKind::Identifier),
        ColumnSpec::new(columns::BIRTH_DATE, ColumnKind::Date),
        ColumnSpec::new(columns::GENDER, ColumnKind::Categorical),
    ],
};

pub const CONSULTATIONS: TableSchema = TableSchema {
    name: "consultations",
    columns: &[
        ColumnSpec::new(columns::CONSULTATION_ID, ColumnKind::Identifier),
        ColumnSpec::new(columns::PATIENT_ID, ColumnKind::Identifier),
        ColumnSpec::new(columns::DATE_CONSULTATION, ColumnKind::Date),
        ColumnSpec::new(columns::DIAGNOSTIC, ColumnKind::Categorical),
    ],
};
