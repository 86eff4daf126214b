//! Command-line argument parsing for Ising simulations

use clap::Parser;

/// 2D Ising model Metropolis Monte Carlo with YAML configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "ising")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "example/ising.yaml")]
    pub config_file: String,

    /// Log file path (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override lattice half width N (side 2N+1)
    #[arg(long, allow_negative_numbers = true)]
    pub half_width: Option<i64>,

    /// Override coupling constant J
    #[arg(long, allow_negative_numbers = true)]
    pub coupling: Option<f64>,

    /// Override thermal energy scale k_BT
    #[arg(long, allow_negative_numbers = true)]
    pub thermal_energy: Option<f64>,

    /// Override number of Monte Carlo steps
    #[arg(long, allow_negative_numbers = true)]
    pub steps: Option<i64>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Steps between live display updates (0 disables)
    #[arg(long)]
    pub render_interval: Option<u64>,

    /// Steps between persisted snapshots (0 disables)
    #[arg(long)]
    pub snapshot_interval: Option<u64>,

    /// Directory for lattice snapshots
    #[arg(long)]
    pub snapshot_dir: Option<String>,

    /// Run a temperature scan instead of a single simulation
    #[arg(long)]
    pub scan: bool,
}
