//! Result table assembly and writing
//!
//! The final table is the interpolated per-group statistics followed by the
//! "Aggregate" rows, with columns:
//! `taxonomic_group, year, rli, qn_95, qn_05, n, sample_size_summary`.

use crate::error::Result;
use crate::pipeline::{RliResult, AGGREGATE_GROUP};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

pub const OUTPUT_COLUMNS: [&str; 7] = [
    "taxonomic_group",
    "year",
    "rli",
    "qn_95",
    "qn_05",
    "n",
    "sample_size_summary",
];

/// One row of the output table
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub taxonomic_group: String,
    pub year: i64,
    pub rli: f64,
    pub qn_95: Option<f64>,
    pub qn_05: Option<f64>,
    pub n: Option<i64>,
    pub sample_size_summary: Option<String>,
}

impl RliResult {
    /// Per-group rows (by group, then year) followed by Aggregate rows (by year)
    pub fn rows(&self) -> Vec<ResultRow> {
        let groups = self.groups.iter().map(|s| ResultRow {
            taxonomic_group: s.taxonomic_group.clone(),
            year: s.year,
            rli: s.rli,
            qn_95: Some(s.qn_95),
            qn_05: Some(s.qn_05),
            n: Some(s.n),
            sample_size_summary: Some(s.sample_size_summary.clone()),
        });

        let aggregate = self.aggregate.iter().map(|a| ResultRow {
            taxonomic_group: AGGREGATE_GROUP.to_string(),
            year: a.year,
            rli: a.rli,
            qn_95: a.qn_95,
            qn_05: a.qn_05,
            n: a.n,
            sample_size_summary: a.sample_size_summary.clone(),
        });

        groups.chain(aggregate).collect()
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        rows_to_dataframe(&self.rows())
    }
}

pub fn rows_to_dataframe(rows: &[ResultRow]) -> Result<DataFrame> {
    let groups: Vec<&str> = rows.iter().map(|r| r.taxonomic_group.as_str()).collect();
    let years: Vec<i64> = rows.iter().map(|r| r.year).collect();
    let rli: Vec<f64> = rows.iter().map(|r| r.rli).collect();
    let qn_95: Vec<Option<f64>> = rows.iter().map(|r| r.qn_95).collect();
    let qn_05: Vec<Option<f64>> = rows.iter().map(|r| r.qn_05).collect();
    let n: Vec<Option<i64>> = rows.iter().map(|r| r.n).collect();
    let sizes: Vec<Option<&str>> = rows.iter().map(|r| r.sample_size_summary.as_deref()).collect();

    let [c_group, c_year, c_rli, c_qn_95, c_qn_05, c_n, c_sizes] = OUTPUT_COLUMNS;
    let df = df![
        c_group => groups,
        c_year => years,
        c_rli => rli,
        c_qn_95 => qn_95,
        c_qn_05 => qn_05,
        c_n => n,
        c_sizes => sizes,
    ]?;
    Ok(df)
}

/// Write the result table as Parquet (`.parquet`) or CSV, creating parent
/// directories as needed
///
/// The table is written to a hidden sibling file and renamed onto `path`
/// only once it is complete, so a failed write never leaves a partial
/// result behind.
pub fn write_results(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    let written = write_frame(df, &staging, is_parquet(path))
        .and_then(|()| fs::rename(&staging, path).map_err(Into::into));
    if written.is_err() {
        let _ = fs::remove_file(&staging);
    }
    written?;

    info!("Saved {} result rows to {:?}", df.height(), path);
    Ok(())
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

/// `dir/.name.tmp` next to `dir/name`
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn write_frame(df: &mut DataFrame, path: &Path, parquet: bool) -> Result<()> {
    let file = File::create(path)?;
    if parquet {
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Zstd(None))
            .finish(df)?;
    } else {
        CsvWriter::new(file).include_header(true).finish(df)?;
    }
    Ok(())
}
