//! DataFrame helpers shared by the stages.

use polars::prelude::*;

use consult_model::SchemaError;

use crate::error::Result;

/// Fails with a [`SchemaError`] naming every absent column.
pub fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    let present = df.get_column_names();
    let missing: Vec<String> = columns
        .iter()
        .filter(|name| !present.iter().any(|p| p.as_str() == **name))
        .map(|name| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::new(table, missing).into())
    }
}

/// Returns the column as text, casting when it holds another type.
pub fn text_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df.column(name)?;
    let cast = column.cast(&DataType::String)?;
    Ok(cast.str()?.clone())
}

/// Counts null entries of a column.
pub fn null_count(df: &DataFrame, name: &str) -> Result<usize> {
    Ok(df.column(name)?.null_count())
}

/// Categorical dtype backed by the global category registry.
pub fn categorical_dtype() -> DataType {
    DataType::from_categories(Categories::global())
}
