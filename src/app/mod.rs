mod report;
mod runner;

pub use runner::{run_scan, run_single};

use self::report::{report_run_summary, report_scan};
use crate::config::{Args, Config, RunConfig};
use crate::io::{
    create_output_file, setup_output, write_scan_results, write_series, write_theory_curve,
};
use crate::ising::analysis::theoretical_curve;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use tracing::info;

/// Temperature range and resolution of the exported Onsager curve
const THEORY_T_MIN: f64 = 1.0;
const THEORY_T_MAX: f64 = 4.0;
const THEORY_POINTS: usize = 100;

pub struct IsingApplication {
    args: Args,
    config: Config,
}

impl IsingApplication {
    pub fn from_cli() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Reading configuration from: {}", self.args.config_file);

        let run_config = self.config.validate().wrap_err("Invalid configuration")?;
        info!("Configuration loaded:\n{:#?}", run_config);

        match &run_config.scan {
            Some(settings) => {
                let points = run_scan(&run_config, settings)?;
                report_scan(&points, run_config.params.coupling);
                if let Some(path) = &run_config.output.scan_file {
                    let mut writer = create_output_file(path)?;
                    write_scan_results(&mut writer, &points)
                        .wrap_err("Failed to write scan results")?;
                    info!("Scan results written to {}", path.display());
                }
            }
            None => {
                let engine = run_single(&run_config)?;
                report_run_summary(&run_config, &engine)?;
                if let Some(path) = &run_config.output.series_file {
                    let mut writer = create_output_file(path)?;
                    write_series(&mut writer, engine.series().series())
                        .wrap_err("Failed to write magnetization series")?;
                    info!("Magnetization series written to {}", path.display());
                }
            }
        }

        write_theory(&run_config)
    }
}

fn write_theory(config: &RunConfig) -> Result<()> {
    if let Some(path) = &config.output.theory_file {
        let curve = theoretical_curve(
            THEORY_T_MIN,
            THEORY_T_MAX,
            THEORY_POINTS,
            config.params.coupling,
        );
        let mut writer = create_output_file(path)?;
        write_theory_curve(&mut writer, &curve).wrap_err("Failed to write theoretical curve")?;
        info!("Theoretical magnetization curve written to {}", path.display());
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = Config::from_yaml_str(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_overrides(args);

    Ok(config)
}
