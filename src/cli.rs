use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nimbus ensemble post-processing.
#[derive(Parser)]
#[command(
    name = "nimbus",
    version,
    about = "Ensemble Copula Coupling conversions for probabilistic forecasts"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Convert a probability, percentile or realization cube to realizations.
    Realizations(RealizationsArgs),
    /// Convert a probability or percentile cube to percentiles.
    Percentiles(PercentilesArgs),
}

/// Arguments for the `realizations` subcommand.
#[derive(clap::Args)]
pub struct RealizationsArgs {
    /// Path to the input cube (JSON).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to a raw realization cube used for reordering.
    #[arg(short, long)]
    pub raw: Option<PathBuf>,

    /// Path for the output realization cube (JSON).
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of output realizations; defaults to the raw member count.
    #[arg(long)]
    pub realizations_count: Option<usize>,

    /// Seed for random tie-breaking.
    #[arg(long)]
    pub random_seed: Option<u64>,

    /// Tie-break rule for equal raw values: `random` or `realization`.
    #[arg(long)]
    pub tie_break: Option<String>,

    /// Warn instead of failing when data exceeds the ECC bounds.
    #[arg(long)]
    pub ignore_ecc_bounds_exceedance: bool,

    /// Leave the ECC bounds out of the distribution tails.
    #[arg(long)]
    pub skip_ecc_bounds: bool,
}

/// Arguments for the `percentiles` subcommand.
#[derive(clap::Args)]
pub struct PercentilesArgs {
    /// Path to the input cube (JSON).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path for the output percentile cube (JSON).
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of percentiles to produce.
    #[arg(long, conflicts_with = "percentiles")]
    pub count: Option<usize>,

    /// Explicit percentiles, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub percentiles: Option<Vec<f64>>,

    /// Percentile spacing for `--count`: `quantile`, `midpoint` or `random`.
    #[arg(long)]
    pub sampling: Option<String>,

    /// Warn instead of failing when data exceeds the ECC bounds.
    #[arg(long)]
    pub ignore_ecc_bounds_exceedance: bool,

    /// Leave the ECC bounds out of the distribution tails.
    #[arg(long)]
    pub skip_ecc_bounds: bool,
}
