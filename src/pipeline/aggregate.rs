//! CROSS-GROUP AGGREGATE: one "Aggregate" row per year
//!
//! `rli` is the arithmetic mean of every group's projected RLI for that
//! year (Butchart et al., 2010). Depending on `AggregateMode`, the other
//! columns are averaged/merged or left null.

use super::TrendStatistic;
use crate::config::AggregateMode;
use crate::utils::mean;
use std::collections::{BTreeMap, BTreeSet};

/// Taxonomic group label of the cross-group rows
pub const AGGREGATE_GROUP: &str = "Aggregate";

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub year: i64,
    pub rli: f64,
    pub qn_95: Option<f64>,
    pub qn_05: Option<f64>,
    pub n: Option<i64>,
    pub sample_size_summary: Option<String>,
}

/// Collapse all groups into one row per year, sorted by year
pub fn aggregate(trends: &[TrendStatistic], mode: AggregateMode) -> Vec<AggregateRow> {
    let mut by_year: BTreeMap<i64, Vec<&TrendStatistic>> = BTreeMap::new();
    for t in trends {
        by_year.entry(t.year).or_default().push(t);
    }

    by_year
        .into_iter()
        .filter_map(|(year, rows)| {
            let column = |value: fn(&TrendStatistic) -> f64| -> Vec<f64> {
                rows.iter().map(|t| value(t)).collect()
            };
            let rli = mean(&column(|t| t.rli))?;

            let row = match mode {
                AggregateMode::Mean => {
                    let summaries: BTreeSet<&str> =
                        rows.iter().map(|t| t.sample_size_summary.as_str()).collect();
                    AggregateRow {
                        year,
                        rli,
                        qn_95: mean(&column(|t| t.qn_95)),
                        qn_05: mean(&column(|t| t.qn_05)),
                        n: mean(&column(|t| t.n)).map(|n| n.round() as i64),
                        sample_size_summary: Some(summaries.into_iter().collect::<Vec<_>>().join(";")),
                    }
                }
                AggregateMode::RliOnly => AggregateRow {
                    year,
                    rli,
                    qn_95: None,
                    qn_05: None,
                    n: None,
                    sample_size_summary: None,
                },
            };
            Some(row)
        })
        .collect()
}
