//! Ising Monte Carlo Command-Line Interface
//!
//! This is the main entry point for running 2D Ising simulations with YAML configuration.

use color_eyre::eyre::Result;
use ising_mc::app::IsingApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    IsingApplication::from_cli()?.run()
}
