//! Calculate the Global Red List Index from an assessment table
//!
//! Usage:
//!   cargo run --release --bin global_rli -- assessments.csv results/rli.csv \
//!       --number-of-repetitions 1000 --seed 42 --plot
//!
//! Logging honours RUST_LOG; `--verbose` enables per-partition debug output.

use anyhow::{Context, Result};
use clap::Parser;
use red_list_index::{
    plot_path, run, write_plot, write_results, AggregateMode, AssessmentData, CategoryWeightTable,
    PipelineConfig, Repetitions, SamplingMode,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "global_rli",
    about = "Calculate Global Red List Index from input CSV",
    version
)]
struct Cli {
    /// Path to the input CSV (or Parquet) file
    input: PathBuf,

    /// Path to save the output CSV (or Parquet) file
    output: PathBuf,

    /// Number of repetitions (default: 1000, minimum: 1, maximum: 10000)
    #[arg(long = "number-of-repetitions", alias = "number_of_repetitions", value_parser = parse_repetitions)]
    repetitions: Option<Repetitions>,

    /// Base seed for reproducible Data Deficient imputation
    #[arg(long)]
    seed: Option<u64>,

    /// How Data Deficient weights are drawn from known weights
    #[arg(long, value_enum)]
    sampling: Option<SamplingMode>,

    /// What the Aggregate rows carry besides rli
    #[arg(long, value_enum)]
    aggregate: Option<AggregateMode>,

    /// JSON pipeline configuration; explicit flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save an SVG chart next to the output file
    #[arg(long)]
    plot: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

fn parse_repetitions(value: &str) -> std::result::Result<Repetitions, String> {
    let parsed: i64 = value.parse().map_err(|e| format!("{e}"))?;
    Repetitions::new(parsed).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match calculate(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "red_list_index=debug,global_rli=debug,warn"
    } else {
        "red_list_index=info,global_rli=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => PipelineConfig::default(),
    };

    if let Some(repetitions) = cli.repetitions {
        config.repetitions = repetitions;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(sampling) = cli.sampling {
        config.sampling = sampling;
    }
    if let Some(aggregate) = cli.aggregate {
        config.aggregate = aggregate;
    }

    Ok(config)
}

fn calculate(cli: Cli) -> Result<()> {
    let start = Instant::now();
    let config = resolve_config(&cli)?;
    tracing::debug!("Resolved config: {}", config.to_json()?);
    let table = CategoryWeightTable::default();

    tracing::info!("Processing and validating input: {:?}", cli.input);
    let data = AssessmentData::load(&cli.input, &table)
        .with_context(|| format!("Failed to validate input: {:?}", cli.input))?;
    let observations = data
        .observations()
        .context("Failed to read validated observations")?;

    let result = run(&observations, &config, &table).context("Failed to compute Red List Index")?;

    let mut df = result.to_dataframe().context("Failed to build result table")?;
    write_results(&mut df, &cli.output)
        .with_context(|| format!("Failed to write results: {:?}", cli.output))?;

    if cli.plot {
        let path = plot_path(&cli.output);
        write_plot(&result.rows(), &path).with_context(|| format!("Failed to save plot: {:?}", path))?;
    }

    tracing::info!(
        "Done in {:.2}s ({} groups, {} aggregate years, seed {})",
        start.elapsed().as_secs_f64(),
        result
            .groups
            .iter()
            .map(|s| s.taxonomic_group.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len(),
        result.aggregate.len(),
        result.seed
    );

    Ok(())
}
