//! Assessment Data Loading and Validation
//!
//! Loads species assessment tables (CSV or Parquet) with Polars, validates
//! them against the input schema and attaches a category weight to every
//! row.
//!
//! Validation order:
//! 1. Required columns present (fails fast, nothing else can be checked)
//! 2. Column types, null counts and category values (all violations collected)
//! 3. Weight column derived from the category table

use crate::categories::CategoryWeightTable;
use crate::error::{Result, RliError};
use crate::utils::{rename_legacy_column, select_required};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Column names of the input and output tables
pub mod columns {
    pub const IDENTIFIER: &str = "identifier";
    /// Older exports name the identifier after the IUCN SIS database
    pub const LEGACY_IDENTIFIER: &str = "sis_taxon_id";
    pub const RED_LIST_CATEGORY: &str = "red_list_category";
    pub const YEAR: &str = "year";
    pub const TAXONOMIC_GROUP: &str = "taxonomic_group";
    pub const WEIGHT: &str = "weight";

    pub const REQUIRED: [&str; 4] = [IDENTIFIER, RED_LIST_CATEGORY, YEAR, TAXONOMIC_GROUP];
}

/// Widest first-to-last year range accepted within one taxonomic group.
/// Gap filling materializes every year in the range.
pub const MAX_YEAR_SPAN: i64 = 500;

/// Declared type and constraints of one input column
struct ColumnSpec {
    name: &'static str,
    dtype: DataType,
    not_null: bool,
    category_values: bool,
}

fn input_schema() -> [ColumnSpec; 4] {
    [
        ColumnSpec {
            name: columns::IDENTIFIER,
            dtype: DataType::Int64,
            not_null: true,
            category_values: false,
        },
        ColumnSpec {
            name: columns::RED_LIST_CATEGORY,
            dtype: DataType::String,
            not_null: true,
            category_values: true,
        },
        ColumnSpec {
            name: columns::YEAR,
            dtype: DataType::Int64,
            not_null: true,
            category_values: false,
        },
        ColumnSpec {
            name: columns::TAXONOMIC_GROUP,
            dtype: DataType::String,
            not_null: true,
            category_values: false,
        },
    ]
}

/// One validated assessment row with its derived weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedObservation {
    pub identifier: i64,
    pub red_list_category: String,
    pub year: i64,
    pub taxonomic_group: String,
    /// `None` exactly when the category is Data Deficient
    pub weight: Option<i64>,
}

/// Validated assessment table with a `weight` column
#[derive(Debug, Clone)]
pub struct AssessmentData {
    pub df: DataFrame,
}

impl AssessmentData {
    /// Load and validate an assessment file (`.parquet` or CSV)
    pub fn load(path: &Path, table: &CategoryWeightTable) -> Result<Self> {
        info!("Loading assessments from {:?}", path);

        let is_parquet = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        let df = if is_parquet {
            ParquetReader::new(File::open(path)?).finish()?
        } else {
            CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.into()))?
                .finish()?
        };

        debug!("Read {} rows × {} columns", df.height(), df.width());
        Self::from_frame(df, table)
    }

    /// Validate an in-memory table and attach weights
    pub fn from_frame(mut df: DataFrame, table: &CategoryWeightTable) -> Result<Self> {
        rename_legacy_column(&mut df, columns::LEGACY_IDENTIFIER, columns::IDENTIFIER)?;
        let df = select_required(&df, &columns::REQUIRED)?;
        validate_schema(&df, table)?;
        let df = add_weight_column(&df, table)?;

        info!("Validated {} assessment rows", df.height());
        Ok(Self { df })
    }

    /// Typed rows for the pipeline
    pub fn observations(&self) -> Result<Vec<WeightedObservation>> {
        let ids = self.df.column(columns::IDENTIFIER)?.i64()?;
        let categories = self.df.column(columns::RED_LIST_CATEGORY)?.str()?;
        let years = self.df.column(columns::YEAR)?.i64()?;
        let groups = self.df.column(columns::TAXONOMIC_GROUP)?.str()?;
        let weights = self.df.column(columns::WEIGHT)?.i64()?;

        ids.into_iter()
            .zip(categories)
            .zip(years)
            .zip(groups)
            .zip(weights)
            .map(|((((id, category), year), group), weight)| {
                match (id, category, year, group) {
                    (Some(identifier), Some(category), Some(year), Some(group)) => {
                        Ok(WeightedObservation {
                            identifier,
                            red_list_category: category.to_string(),
                            year,
                            taxonomic_group: group.to_string(),
                            weight,
                        })
                    }
                    _ => Err(RliError::SchemaValidation(vec![
                        "Null value found in a required column".to_string(),
                    ])),
                }
            })
            .collect()
    }

    /// Row counts per (group, year, category), sorted
    pub fn category_counts(&self) -> Result<DataFrame> {
        let counts = self
            .df
            .clone()
            .lazy()
            .group_by([
                col(columns::TAXONOMIC_GROUP),
                col(columns::YEAR),
                col(columns::RED_LIST_CATEGORY),
            ])
            .agg([len().alias("count")])
            .sort(
                [columns::TAXONOMIC_GROUP, columns::YEAR, columns::RED_LIST_CATEGORY],
                Default::default(),
            )
            .collect()?;
        Ok(counts)
    }
}

/// Check column types, null counts and category values.
///
/// Every violation is collected and reported together in one
/// `SchemaValidation` error.
pub fn validate_schema(df: &DataFrame, table: &CategoryWeightTable) -> Result<()> {
    let mut errors = Vec::new();

    for spec in input_schema() {
        let column = df.column(spec.name)?;

        if column.dtype() != &spec.dtype {
            errors.push(format!(
                "Column '{}' must be {:?}, got {:?}",
                spec.name,
                spec.dtype,
                column.dtype()
            ));
        }

        if spec.not_null {
            let nulls = column.null_count();
            if nulls > 0 {
                errors.push(format!("Column '{}' contains {} null value(s)", spec.name, nulls));
            }
        }

        if spec.category_values && column.dtype() == &DataType::String {
            let invalid: BTreeSet<&str> = column
                .str()?
                .into_iter()
                .flatten()
                .filter(|c| !table.contains(c))
                .collect();

            if !invalid.is_empty() {
                errors.push(format!(
                    "Column '{}' has invalid value(s) {:?}; allowed: {:?}",
                    spec.name,
                    invalid,
                    table.codes()
                ));
            }
        }
    }

    errors.extend(year_span_violations(df)?);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RliError::SchemaValidation(errors))
    }
}

/// Groups whose year range exceeds `MAX_YEAR_SPAN`, usually a corrupt year
fn year_span_violations(df: &DataFrame) -> Result<Vec<String>> {
    let years = df.column(columns::YEAR)?;
    let groups = df.column(columns::TAXONOMIC_GROUP)?;
    if years.dtype() != &DataType::Int64 || groups.dtype() != &DataType::String {
        return Ok(Vec::new());
    }

    let mut ranges: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for (group, year) in groups.str()?.into_iter().zip(years.i64()?) {
        if let (Some(group), Some(year)) = (group, year) {
            let range = ranges.entry(group).or_insert((year, year));
            range.0 = range.0.min(year);
            range.1 = range.1.max(year);
        }
    }

    Ok(ranges
        .into_iter()
        .filter(|(_, (min, max))| max.saturating_sub(*min) > MAX_YEAR_SPAN)
        .map(|(group, (min, max))| {
            format!(
                "Column '{}' spans {}..={} in taxonomic group '{}' (at most {} years allowed)",
                columns::YEAR,
                min,
                max,
                group,
                MAX_YEAR_SPAN
            )
        })
        .collect())
}

/// Append a `weight` column derived from `red_list_category`
pub fn add_weight_column(df: &DataFrame, table: &CategoryWeightTable) -> Result<DataFrame> {
    if df.height() == 0 {
        return Err(RliError::EmptyCategoryColumn(columns::RED_LIST_CATEGORY.to_string()));
    }

    let weights: Vec<Option<i64>> = df
        .column(columns::RED_LIST_CATEGORY)?
        .str()?
        .into_iter()
        .map(|category| match category {
            Some(c) => table.weight_of(c),
            None => Err(RliError::InvalidCategory("null".to_string())),
        })
        .collect::<Result<_>>()?;

    let mut weighted = df.clone();
    weighted.with_column(Series::new(columns::WEIGHT.into(), weights))?;
    Ok(weighted)
}
