//! DataFrame column helpers with presence validation
//!
//! Provides explicit patterns for addressing required columns so a table
//! that lacks one fails with a named error instead of a generic lookup
//! failure.

use crate::error::{Result, RliError};
use polars::prelude::*;
use std::collections::HashSet;

/// Required columns absent from `df`, sorted by name
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let actual: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut missing: Vec<String> = required
        .iter()
        .filter(|name| !actual.contains(**name))
        .map(|name| name.to_string())
        .collect();
    missing.sort();
    missing
}

/// Materialize `df` with exactly the required columns, in the given order
///
/// # Errors
/// `MissingColumns` naming every absent column
///
/// # Example
/// ```rust,ignore
/// let df = select_required(&raw, &["identifier", "year"])?;
/// ```
pub fn select_required(df: &DataFrame, required: &[&str]) -> Result<DataFrame> {
    let missing = missing_columns(df, required);
    if !missing.is_empty() {
        return Err(RliError::MissingColumns(missing));
    }

    let col_exprs: Vec<Expr> = required.iter().map(|&name| col(name)).collect();
    let selected = df.clone().lazy().select(&col_exprs).collect()?;
    Ok(selected)
}

/// Rename `legacy` to `canonical` when only the legacy name is present
pub fn rename_legacy_column(df: &mut DataFrame, legacy: &str, canonical: &str) -> Result<()> {
    let names: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    if !names.contains(canonical) && names.contains(legacy) {
        df.rename(legacy, canonical.into())?;
    }
    Ok(())
}
