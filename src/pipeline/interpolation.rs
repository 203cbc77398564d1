//! TEMPORAL INTERPOLATION: fill missing years inside each group's range
//!
//! For each taxonomic group:
//! 1. Build every year from the group's first to last observed year
//! 2. Left-join the existing statistics onto that range
//! 3. Linearly interpolate `rli`, `qn_05` and `qn_95` across gaps
//! 4. Forward-fill `n` and `sample_size_summary` from the last known year
//!
//! Nothing is extrapolated here; groups with a single year pass through.

use super::GroupYearStatistic;
use crate::utils::{forward_fill, interpolate_gaps};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Complete each group's year sequence, sorted by group then year
pub fn fill_missing_years(statistics: &[GroupYearStatistic]) -> Vec<GroupYearStatistic> {
    let mut by_group: BTreeMap<&str, Vec<&GroupYearStatistic>> = BTreeMap::new();
    for s in statistics {
        by_group.entry(s.taxonomic_group.as_str()).or_default().push(s);
    }

    let mut filled = Vec::with_capacity(statistics.len());

    for (group, rows) in by_group {
        let by_year: FxHashMap<i64, &GroupYearStatistic> = rows.iter().map(|s| (s.year, *s)).collect();
        let (Some(&min_year), Some(&max_year)) = (by_year.keys().min(), by_year.keys().max()) else {
            continue;
        };

        if min_year == max_year {
            warn!("Taxonomic group '{}' has a single year ({}); nothing to interpolate", group, min_year);
            filled.extend(rows.into_iter().cloned());
            continue;
        }

        let years: Vec<i64> = (min_year..=max_year).collect();
        let joined: Vec<Option<&GroupYearStatistic>> =
            years.iter().map(|y| by_year.get(y).copied()).collect();

        let rli = interpolate_gaps(&joined.iter().map(|s| s.map(|s| s.rli)).collect::<Vec<_>>());
        let qn_05 = interpolate_gaps(&joined.iter().map(|s| s.map(|s| s.qn_05)).collect::<Vec<_>>());
        let qn_95 = interpolate_gaps(&joined.iter().map(|s| s.map(|s| s.qn_95)).collect::<Vec<_>>());
        let n = forward_fill(&joined.iter().map(|s| s.map(|s| s.n)).collect::<Vec<_>>());
        let sample_sizes = forward_fill(
            &joined
                .iter()
                .map(|s| s.map(|s| s.sample_size_summary.clone()))
                .collect::<Vec<_>>(),
        );

        debug!(
            "{}: {} observed years over {}..={}",
            group,
            by_year.len(),
            min_year,
            max_year
        );

        for (i, &year) in years.iter().enumerate() {
            // Both range ends are observed, so every slot is filled
            let (Some(rli), Some(qn_05), Some(qn_95), Some(n), Some(summary)) =
                (rli[i], qn_05[i], qn_95[i], n[i], sample_sizes[i].clone())
            else {
                continue;
            };

            filled.push(GroupYearStatistic {
                taxonomic_group: group.to_string(),
                year,
                rli,
                qn_05,
                qn_95,
                n,
                sample_size_summary: summary,
            });
        }
    }

    filled
}
