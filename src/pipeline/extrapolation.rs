//! TREND EXTRAPOLATION: project each group's linear trend onto the global
//! year axis
//!
//! The global axis is the union of years present for any group. Each group
//! gets an independent least-squares line for `rli`, `qn_05` and `qn_95`
//! through its own years; projections are clamped to [0, 1].

use super::GroupYearStatistic;
use crate::error::{Result, RliError};
use crate::utils::{mean, LinearFit};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Projected trend value for one group and year
#[derive(Debug, Clone, PartialEq)]
pub struct TrendStatistic {
    pub taxonomic_group: String,
    pub year: i64,
    pub rli: f64,
    pub qn_05: f64,
    pub qn_95: f64,
    /// Mean repetition count of the group's observed years
    pub n: f64,
    /// The group's distinct sample size summaries, `;`-joined
    pub sample_size_summary: String,
}

/// Project every group across the union of all groups' years
///
/// # Errors
/// `InsufficientDataForFit` when a group has fewer than two distinct years
pub fn extrapolate(statistics: &[GroupYearStatistic]) -> Result<Vec<TrendStatistic>> {
    let all_years: BTreeSet<i64> = statistics.iter().map(|s| s.year).collect();

    let mut by_group: BTreeMap<&str, Vec<&GroupYearStatistic>> = BTreeMap::new();
    for s in statistics {
        by_group.entry(s.taxonomic_group.as_str()).or_default().push(s);
    }

    let mut trends = Vec::with_capacity(by_group.len() * all_years.len());

    for (group, mut rows) in by_group {
        rows.sort_by_key(|s| s.year);

        let distinct_years = rows.iter().map(|s| s.year).collect::<BTreeSet<_>>().len();
        let insufficient = || RliError::InsufficientDataForFit {
            group: group.to_string(),
            years: distinct_years,
        };
        if distinct_years < 2 {
            return Err(insufficient());
        }

        let xs: Vec<f64> = rows.iter().map(|s| s.year as f64).collect();
        let fit_of = |value: fn(&GroupYearStatistic) -> f64| {
            let ys: Vec<f64> = rows.iter().map(|s| value(s)).collect();
            LinearFit::fit(&xs, &ys).ok_or_else(insufficient)
        };
        let rli_fit = fit_of(|s| s.rli)?;
        let qn_05_fit = fit_of(|s| s.qn_05)?;
        let qn_95_fit = fit_of(|s| s.qn_95)?;

        let n_values: Vec<f64> = rows.iter().map(|s| s.n as f64).collect();
        let n = mean(&n_values).ok_or_else(insufficient)?;

        let mut summaries: Vec<&str> = Vec::new();
        for s in &rows {
            if !summaries.contains(&s.sample_size_summary.as_str()) {
                summaries.push(&s.sample_size_summary);
            }
        }
        let sample_size_summary = summaries.join(";");

        debug!(
            "{}: rli slope {:.5}/year over {} years",
            group, rli_fit.slope, distinct_years
        );

        for &year in &all_years {
            let x = year as f64;
            trends.push(TrendStatistic {
                taxonomic_group: group.to_string(),
                year,
                rli: rli_fit.predict(x).clamp(0.0, 1.0),
                qn_05: qn_05_fit.predict(x).clamp(0.0, 1.0),
                qn_95: qn_95_fit.predict(x).clamp(0.0, 1.0),
                n,
                sample_size_summary: sample_size_summary.clone(),
            });
        }
    }

    Ok(trends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stat(group: &str, year: i64, rli: f64, n: i64) -> GroupYearStatistic {
        GroupYearStatistic {
            taxonomic_group: group.to_string(),
            year,
            rli,
            qn_05: rli - 0.05,
            qn_95: rli + 0.05,
            n,
            sample_size_summary: format!("{}({})", group, year - 1990),
        }
    }

    #[test]
    fn test_projects_onto_global_years() {
        let input = vec![
            stat("Bird", 2000, 0.80, 100),
            stat("Bird", 2001, 0.78, 100),
            stat("Bird", 2002, 0.76, 100),
            stat("Mammal", 2002, 0.60, 200),
            stat("Mammal", 2003, 0.62, 300),
        ];

        let trends = extrapolate(&input).unwrap();
        assert_eq!(trends.len(), 8);

        let bird: Vec<&TrendStatistic> = trends.iter().filter(|t| t.taxonomic_group == "Bird").collect();
        assert_eq!(bird.iter().map(|t| t.year).collect::<Vec<_>>(), vec![2000, 2001, 2002, 2003]);
        assert_relative_eq!(bird[3].rli, 0.74, epsilon = 1e-9);
        assert_relative_eq!(bird[3].qn_05, 0.69, epsilon = 1e-9);
        assert_relative_eq!(bird[3].qn_95, 0.79, epsilon = 1e-9);
        assert_relative_eq!(bird[0].n, 100.0);
        assert_eq!(bird[0].sample_size_summary, "Bird(10);Bird(11);Bird(12)");

        let mammal: Vec<&TrendStatistic> = trends.iter().filter(|t| t.taxonomic_group == "Mammal").collect();
        assert_relative_eq!(mammal[0].rli, 0.56, epsilon = 1e-9);
        assert_relative_eq!(mammal[0].n, 250.0);
    }

    #[test]
    fn test_projection_is_clamped() {
        let input = vec![
            stat("Frog", 2000, 0.95, 10),
            stat("Frog", 2001, 0.99, 10),
            stat("Snail", 1990, 0.50, 10),
            stat("Snail", 2001, 0.50, 10),
        ];

        let trends = extrapolate(&input).unwrap();
        for t in &trends {
            for v in [t.rli, t.qn_05, t.qn_95] {
                assert!((0.0..=1.0).contains(&v), "{} {} out of range: {}", t.taxonomic_group, t.year, v);
            }
        }

        // Frog rises 0.04/year; back-projected to 1990 it stays in range, forward it saturates
        let frog_1990 = trends.iter().find(|t| t.taxonomic_group == "Frog" && t.year == 1990).unwrap();
        assert_relative_eq!(frog_1990.rli, 0.55, epsilon = 1e-9);
        let frog_2001 = trends.iter().find(|t| t.taxonomic_group == "Frog" && t.year == 2001).unwrap();
        assert_eq!(frog_2001.qn_95, 1.0);
    }

    #[test]
    fn test_clamps_below_zero() {
        let input = vec![
            stat("Coral", 2010, 0.30, 10),
            stat("Coral", 2011, 0.10, 10),
            stat("Crab", 2020, 0.5, 10),
            stat("Crab", 2021, 0.5, 10),
        ];

        let trends = extrapolate(&input).unwrap();
        let coral_2020 = trends.iter().find(|t| t.taxonomic_group == "Coral" && t.year == 2020).unwrap();
        assert_eq!(coral_2020.rli, 0.0);
        assert_eq!(coral_2020.qn_05, 0.0);
        assert_eq!(coral_2020.qn_95, 0.0);
    }

    #[test]
    fn test_single_year_group_cannot_be_fitted() {
        let input = vec![
            stat("Bird", 2000, 0.8, 1),
            stat("Bird", 2001, 0.7, 1),
            stat("Moss", 2000, 0.9, 1),
        ];

        let err = extrapolate(&input).unwrap_err();
        assert!(matches!(
            err,
            RliError::InsufficientDataForFit { ref group, years: 1 } if group == "Moss"
        ));
    }
}
