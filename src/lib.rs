//! Red List Index
//!
//! Computes the Red List Index (RLI) per taxonomic group and year from
//! species assessment tables, with Monte-Carlo imputation of Data Deficient
//! species, gap filling, trend extrapolation and a cross-group aggregate.
//!
//! Module layout:
//! - `categories`: Red List category → weight table
//! - `data`: Polars loading and input validation
//! - `calculate`: RLI for one set of weights
//! - `pipeline/`: bootstrap, group/year aggregation, interpolation,
//!   extrapolation, cross-group aggregate
//! - `output`: result table assembly and writing
//! - `plot`: SVG chart of the result table
//! - `utils/`: numeric and DataFrame helpers
//!
//! Method reference: Butchart et al. (2007, 2010).

pub mod calculate;
pub mod categories;
pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod plot;
pub mod utils;

// Re-export commonly used types
pub use calculate::red_list_index;
pub use categories::CategoryWeightTable;
pub use config::{AggregateMode, PipelineConfig, Repetitions, SamplingMode};
pub use data::{AssessmentData, WeightedObservation};
pub use error::{Result, RliError};
pub use output::{write_results, ResultRow};
pub use pipeline::{run, GroupYearStatistic, RliResult};
pub use plot::{plot_path, write_plot};
