//! Pipeline configuration
//!
//! Loaded from an optional JSON file; command-line flags override
//! individual fields.

use crate::error::{Result, RliError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Monte-Carlo repetitions per partition, validated to 1..=10000
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Repetitions(u32);

impl Repetitions {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 10_000;

    pub fn new(value: i64) -> Result<Self> {
        if value < Self::MIN as i64 || value > Self::MAX as i64 {
            return Err(RliError::RepetitionsOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value as u32))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for Repetitions {
    fn default() -> Self {
        Self(1000)
    }
}

impl TryFrom<i64> for Repetitions {
    type Error = RliError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Repetitions> for i64 {
    fn from(r: Repetitions) -> i64 {
        r.0 as i64
    }
}

/// How Data Deficient weights are drawn from the known weights
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingMode {
    /// Each known weight is drawn at most once per repetition
    #[default]
    WithoutReplacement,
    /// Known weights are drawn independently
    WithReplacement,
}

/// What the "Aggregate" rows carry besides `rli`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AggregateMode {
    /// Quantiles, `n` and sample sizes averaged / merged across groups
    #[default]
    Mean,
    /// Only `rli` is averaged; the other columns are null
    RliOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub repetitions: Repetitions,
    /// Base seed for the per-partition generators. Drawn at random when absent.
    pub seed: Option<u64>,
    pub sampling: SamplingMode,
    pub aggregate: AggregateMode,
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Compact JSON form, in the same shape `load` reads
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
