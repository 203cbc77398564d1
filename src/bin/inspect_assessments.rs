//! Inspect an assessment table before running the index
//!
//! Validates the input and prints category counts plus, per
//! (taxonomic group, year), how many Data Deficient rows need imputing and
//! whether sampling without replacement can cover them.
//!
//! Usage: cargo run --bin inspect_assessments -- assessments.csv

use anyhow::{Context, Result};
use clap::Parser;
use red_list_index::pipeline::partition_observations;
use red_list_index::{AssessmentData, CategoryWeightTable};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "inspect_assessments", about = "Validate and summarise an assessment table", version)]
struct Cli {
    /// Path to the input CSV (or Parquet) file
    input: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "red_list_index=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let table = CategoryWeightTable::default();

    let data = AssessmentData::load(&cli.input, &table)
        .with_context(|| format!("Failed to validate input: {:?}", cli.input))?;

    println!("\n=== CATEGORY COUNTS ===\n");
    println!("{}", data.category_counts()?);

    let observations = data.observations()?;
    let partitions = partition_observations(&observations);

    println!("\n=== PARTITIONS ({}) ===\n", partitions.len());
    println!("{:<30} {:>6} {:>8} {:>8}  note", "taxonomic_group", "year", "rows", "dd");

    let mut short = 0;
    for partition in &partitions {
        let (valid, data_deficient) = partition.split_weights();
        let note = if valid.is_empty() && data_deficient > 0 {
            "no known categories"
        } else if data_deficient > valid.len() {
            "needs --sampling with-replacement"
        } else {
            ""
        };
        if !note.is_empty() {
            short += 1;
        }

        println!(
            "{:<30} {:>6} {:>8} {:>8}  {}",
            partition.key.taxonomic_group,
            partition.key.year,
            partition.observations.len(),
            data_deficient,
            note
        );
    }

    println!();
    if short > 0 {
        println!("⚠ {} partition(s) cannot be imputed without replacement", short);
    } else {
        println!("✓ All partitions can be imputed");
    }

    Ok(())
}
