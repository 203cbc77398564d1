//! BOOTSTRAP ESTIMATOR: Data Deficient imputation per partition
//!
//! Data Deficient species are assigned categories drawn from the known
//! (non-DD) species of the same taxonomic group and year, in proportion to
//! how often each category occurs there (Butchart et al., 2010). Repeating
//! the draw gives an empirical RLI distribution summarised by its mean and
//! 5th/95th percentiles.
//!
//! All randomness comes from the caller's `Rng`, so a seeded generator
//! reproduces a run exactly.

use super::GroupYearStatistic;
use crate::calculate::red_list_index;
use crate::categories::CategoryWeightTable;
use crate::config::{Repetitions, SamplingMode};
use crate::data::WeightedObservation;
use crate::error::{Result, RliError};
use crate::utils::{mean, percentile};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

/// (taxonomic group, year) identifying one partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    pub taxonomic_group: String,
    pub year: i64,
}

/// Owned rows of one (taxonomic group, year)
#[derive(Debug, Clone)]
pub struct Partition {
    pub key: PartitionKey,
    pub observations: Vec<WeightedObservation>,
}

impl Partition {
    /// Known weights in row order and the number of Data Deficient rows
    pub fn split_weights(&self) -> (Vec<i64>, usize) {
        let valid: Vec<i64> = self.observations.iter().filter_map(|o| o.weight).collect();
        let data_deficient = self.observations.len() - valid.len();
        (valid, data_deficient)
    }

    pub fn sample_sizes(&self) -> SampleSizes {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for o in &self.observations {
            *counts.entry(o.taxonomic_group.clone()).or_default() += 1;
        }
        SampleSizes(counts.into_iter().collect())
    }
}

/// Row count per taxonomic group label, rendered `Birds(2)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSizes(pub Vec<(String, usize)>);

impl fmt::Display for SampleSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(group, count)| format!("{}({})", group, count))
            .collect();
        write!(f, "{}", parts.join(";"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BootstrapEstimator {
    table: CategoryWeightTable,
    sampling: SamplingMode,
}

impl BootstrapEstimator {
    pub fn new(table: CategoryWeightTable, sampling: SamplingMode) -> Self {
        Self { table, sampling }
    }

    /// Known weights followed by one drawn weight per Data Deficient row
    ///
    /// Without DD rows the known weights are returned as-is and the
    /// generator is not touched.
    pub fn impute_once<R: Rng + ?Sized>(&self, partition: &Partition, rng: &mut R) -> Result<Vec<i64>> {
        let (mut valid, data_deficient) = partition.split_weights();
        if data_deficient == 0 {
            return Ok(valid);
        }
        if valid.is_empty() {
            return Err(RliError::NoValidWeights { data_deficient });
        }

        let sampled: Vec<i64> = match self.sampling {
            SamplingMode::WithoutReplacement => {
                if data_deficient > valid.len() {
                    return Err(RliError::DataDeficientExceedsValid {
                        data_deficient,
                        valid: valid.len(),
                    });
                }
                valid.choose_multiple(rng, data_deficient).copied().collect()
            }
            SamplingMode::WithReplacement => (0..data_deficient)
                .map(|_| valid[rng.gen_range(0..valid.len())])
                .collect(),
        };

        valid.extend(sampled);
        Ok(valid)
    }

    /// Mean and 5th/95th percentile RLI over `repetitions` independent imputations
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        partition: &Partition,
        repetitions: Repetitions,
        rng: &mut R,
    ) -> Result<GroupYearStatistic> {
        let rlis = (0..repetitions.get())
            .map(|_| {
                let weights = self.impute_once(partition, rng)?;
                red_list_index(&weights, &self.table)
            })
            .collect::<Result<Vec<f64>>>()?;

        // Mean across repetitions (Butchart et al., 2010)
        let rli = mean(&rlis).ok_or(RliError::EmptyWeights)?;
        let qn_05 = percentile(&rlis, 5.0).ok_or(RliError::EmptyWeights)?;
        let qn_95 = percentile(&rlis, 95.0).ok_or(RliError::EmptyWeights)?;

        Ok(GroupYearStatistic {
            taxonomic_group: partition.key.taxonomic_group.clone(),
            year: partition.key.year,
            rli,
            qn_05,
            qn_95,
            n: repetitions.get() as i64,
            sample_size_summary: partition.sample_sizes().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn partition(weights: &[Option<i64>]) -> Partition {
        let observations = weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| WeightedObservation {
                identifier: i as i64,
                red_list_category: match weight {
                    Some(0) => "LC",
                    Some(1) => "NT",
                    Some(2) => "VU",
                    Some(3) => "EN",
                    Some(4) => "CR",
                    Some(_) => "EX",
                    None => "DD",
                }
                .to_string(),
                year: 2020,
                taxonomic_group: "Birds".to_string(),
                weight,
            })
            .collect();

        Partition {
            key: PartitionKey {
                taxonomic_group: "Birds".to_string(),
                year: 2020,
            },
            observations,
        }
    }

    fn estimator(sampling: SamplingMode) -> BootstrapEstimator {
        BootstrapEstimator::new(CategoryWeightTable::default(), sampling)
    }

    #[test]
    fn test_no_data_deficient_returns_known_weights() {
        let p = partition(&[Some(3), Some(0), Some(5)]);
        let est = estimator(SamplingMode::WithoutReplacement);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..5 {
            let mut weights = est.impute_once(&p, &mut rng).unwrap();
            weights.sort();
            assert_eq!(weights, vec![0, 3, 5]);
        }
    }

    #[test]
    fn test_no_data_deficient_does_not_consume_randomness() {
        let p = partition(&[Some(1), Some(2)]);
        let est = estimator(SamplingMode::WithoutReplacement);

        let mut used = StdRng::seed_from_u64(9);
        est.impute_once(&p, &mut used).unwrap();
        let mut fresh = StdRng::seed_from_u64(9);
        assert_eq!(used.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn test_imputed_length_and_prefix() {
        let p = partition(&[Some(0), None, Some(4), None, Some(2)]);
        let est = estimator(SamplingMode::WithoutReplacement);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let weights = est.impute_once(&p, &mut rng).unwrap();
            assert_eq!(weights.len(), 5);

            let mut prefix = weights[..3].to_vec();
            prefix.sort();
            assert_eq!(prefix, vec![0, 2, 4]);
            assert!(weights[3..].iter().all(|w| [0, 2, 4].contains(w)));
            // Without replacement the two draws are distinct known rows
            assert_ne!(weights[3], weights[4]);
        }
    }

    #[test]
    fn test_only_data_deficient_fails() {
        let p = partition(&[None, None]);
        let est = estimator(SamplingMode::WithoutReplacement);
        let err = est.impute_once(&p, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, RliError::NoValidWeights { data_deficient: 2 }));
    }

    #[test]
    fn test_more_data_deficient_than_known() {
        let p = partition(&[Some(1), None, None]);

        let err = estimator(SamplingMode::WithoutReplacement)
            .impute_once(&p, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(
            err,
            RliError::DataDeficientExceedsValid { data_deficient: 2, valid: 1 }
        ));

        let weights = estimator(SamplingMode::WithReplacement)
            .impute_once(&p, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(weights, vec![1, 1, 1]);
    }

    #[test]
    fn test_single_repetition_collapses_summary() {
        let p = partition(&[Some(4), Some(5)]);
        let stat = estimator(SamplingMode::WithoutReplacement)
            .estimate(&p, Repetitions::new(1).unwrap(), &mut StdRng::seed_from_u64(3))
            .unwrap();

        assert_relative_eq!(stat.rli, 0.1, epsilon = 1e-12);
        assert_eq!(stat.rli, stat.qn_05);
        assert_eq!(stat.rli, stat.qn_95);
        assert_eq!(stat.n, 1);
        assert_eq!(stat.sample_size_summary, "Birds(2)");
    }

    #[test]
    fn test_estimate_bounds_and_reproducibility() {
        let p = partition(&[Some(0), Some(5), Some(2), None, None]);
        let est = estimator(SamplingMode::WithoutReplacement);
        let reps = Repetitions::new(500).unwrap();

        let a = est.estimate(&p, reps, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = est.estimate(&p, reps, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);

        // Imputed RLI ranges from both DDs drawn as {0, 2} to both as {2, 5}
        assert!(a.qn_05 <= a.rli && a.rli <= a.qn_95);
        assert!(a.qn_05 >= 1.0 - 14.0 / 25.0 - 1e-12);
        assert!(a.qn_95 <= 1.0 - 9.0 / 25.0 + 1e-12);
        assert_eq!(a.n, 500);
    }
}
