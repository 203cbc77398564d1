use polars::error::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RliError>;

#[derive(Error, Debug)]
pub enum RliError {
    /// Every schema violation found in the input table, one per line.
    #[error("Validation errors:\n{}", .0.join("\n"))]
    SchemaValidation(Vec<String>),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Input table has an empty '{0}' column")]
    EmptyCategoryColumn(String),

    #[error("Invalid Red List category: '{0}'")]
    InvalidCategory(String),

    #[error("category weights cannot be empty")]
    EmptyWeights,

    #[error("Invalid weight at index {index}: {reason}")]
    InvalidWeight { index: usize, reason: String },

    #[error("No valid weights to sample from for {data_deficient} Data Deficient row(s)")]
    NoValidWeights { data_deficient: usize },

    #[error(
        "Cannot sample {data_deficient} Data Deficient weight(s) without replacement from {valid} valid weight(s)"
    )]
    DataDeficientExceedsValid { data_deficient: usize, valid: usize },

    #[error("Taxonomic group '{group}' has {years} distinct year(s); a trend needs at least 2")]
    InsufficientDataForFit { group: String, years: usize },

    #[error("number of repetitions must be between {min} and {max}, got {value}")]
    RepetitionsOutOfRange { value: i64, min: u32, max: u32 },

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),
}
