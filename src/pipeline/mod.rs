//! Red List Index pipeline
//!
//! Stages run strictly in sequence, each consuming the previous stage's
//! output:
//! - `group_year`: bootstrap estimate per (taxonomic group, year) partition
//! - `interpolation`: fill missing years inside each group's range
//! - `extrapolation`: linear trend per group across the global year axis
//! - `aggregate`: cross-group "Aggregate" series per year
//!
//! The per-partition bootstrap lives in `bootstrap` and is the only
//! randomized step.

pub mod aggregate;
pub mod bootstrap;
pub mod extrapolation;
pub mod group_year;
pub mod interpolation;

pub use aggregate::{aggregate, AggregateRow, AGGREGATE_GROUP};
pub use bootstrap::{BootstrapEstimator, Partition, PartitionKey, SampleSizes};
pub use extrapolation::{extrapolate, TrendStatistic};
pub use group_year::{partition_observations, partition_seed, GroupYearAggregator};
pub use interpolation::fill_missing_years;

use crate::categories::CategoryWeightTable;
use crate::config::PipelineConfig;
use crate::data::WeightedObservation;
use crate::error::Result;
use tracing::info;

/// Bootstrap summary for one (taxonomic group, year)
#[derive(Debug, Clone, PartialEq)]
pub struct GroupYearStatistic {
    pub taxonomic_group: String,
    pub year: i64,
    /// Mean RLI over the repetitions
    pub rli: f64,
    /// 5th percentile of the repetition RLIs
    pub qn_05: f64,
    /// 95th percentile of the repetition RLIs
    pub qn_95: f64,
    /// Number of repetitions
    pub n: i64,
    /// Rows per taxonomic group in the partition, e.g. `Birds(2)`
    pub sample_size_summary: String,
}

/// Outputs of every pipeline stage that ends up in the result table
#[derive(Debug, Clone)]
pub struct RliResult {
    /// Per-group statistics with missing years interpolated
    pub groups: Vec<GroupYearStatistic>,
    /// Per-group trend lines across the global year range
    pub trends: Vec<TrendStatistic>,
    /// One cross-group row per year
    pub aggregate: Vec<AggregateRow>,
    /// Base seed the partition generators were derived from
    pub seed: u64,
}

/// Run the full pipeline on validated observations
pub fn run(
    observations: &[WeightedObservation],
    config: &PipelineConfig,
    table: &CategoryWeightTable,
) -> Result<RliResult> {
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        "Building Red List Index (repetitions: {}, seed: {}, sampling: {:?})",
        config.repetitions.get(),
        seed,
        config.sampling
    );

    let estimator = BootstrapEstimator::new(*table, config.sampling);
    let aggregator = GroupYearAggregator::new(estimator, config.repetitions, seed);
    let statistics = aggregator.build(observations)?;

    info!("Interpolating RLI for missing years");
    let groups = fill_missing_years(&statistics);

    info!("Extrapolating RLI across the global year range");
    let trends = extrapolate(&groups)?;

    info!("Aggregating RLI across taxonomic groups ({:?})", config.aggregate);
    let aggregate = aggregate(&trends, config.aggregate);

    Ok(RliResult {
        groups,
        trends,
        aggregate,
        seed,
    })
}
