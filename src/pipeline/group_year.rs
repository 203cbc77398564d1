//! GROUP-YEAR AGGREGATOR
//!
//! Partitions the validated observations by (taxonomic group, year) and
//! runs the bootstrap estimator on every partition in parallel (Rayon).
//!
//! Each partition gets its own `StdRng` seeded from the base seed and the
//! partition key, so results do not depend on scheduling order. The key is
//! folded in with SplitMix64 over its bytes, which gives the same seed on
//! every platform and toolchain.

use super::bootstrap::{BootstrapEstimator, Partition, PartitionKey};
use super::GroupYearStatistic;
use crate::config::Repetitions;
use crate::data::WeightedObservation;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Group observations into one owned partition per distinct (group, year),
/// sorted by key
pub fn partition_observations(observations: &[WeightedObservation]) -> Vec<Partition> {
    let mut map: FxHashMap<PartitionKey, Vec<WeightedObservation>> = FxHashMap::default();
    for o in observations {
        let key = PartitionKey {
            taxonomic_group: o.taxonomic_group.clone(),
            year: o.year,
        };
        map.entry(key).or_default().push(o.clone());
    }

    let mut partitions: Vec<Partition> = map
        .into_iter()
        .map(|(key, observations)| Partition { key, observations })
        .collect();
    partitions.sort_by(|a, b| a.key.cmp(&b.key));
    partitions
}

/// SplitMix64 finalizer (Steele, Lea & Flood, 2014)
fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for one partition's generator, stable across runs, targets and
/// dependency versions
///
/// The group name is mixed in as little-endian 8-byte words followed by its
/// length, then the year.
pub fn partition_seed(base_seed: u64, key: &PartitionKey) -> u64 {
    let group = key.taxonomic_group.as_bytes();

    let mut state = splitmix64(base_seed);
    for chunk in group.chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        state = splitmix64(state ^ u64::from_le_bytes(word));
    }
    state = splitmix64(state ^ group.len() as u64);
    splitmix64(state ^ key.year as u64)
}

pub struct GroupYearAggregator {
    estimator: BootstrapEstimator,
    repetitions: Repetitions,
    base_seed: u64,
}

impl GroupYearAggregator {
    pub fn new(estimator: BootstrapEstimator, repetitions: Repetitions, base_seed: u64) -> Self {
        Self {
            estimator,
            repetitions,
            base_seed,
        }
    }

    /// One statistic per distinct (group, year), sorted by group then year
    pub fn build(&self, observations: &[WeightedObservation]) -> Result<Vec<GroupYearStatistic>> {
        let partitions = partition_observations(observations);
        info!(
            "Estimating {} group/year partitions from {} observations",
            partitions.len(),
            observations.len()
        );

        partitions
            .par_iter()
            .map(|partition| {
                let mut rng = StdRng::seed_from_u64(partition_seed(self.base_seed, &partition.key));
                let stat = self.estimator.estimate(partition, self.repetitions, &mut rng)?;
                debug!(
                    "{} {}: rli={:.4} [{:.4}, {:.4}] from {} rows",
                    stat.taxonomic_group,
                    stat.year,
                    stat.rli,
                    stat.qn_05,
                    stat.qn_95,
                    partition.observations.len()
                );
                Ok(stat)
            })
            .collect()
    }
}
