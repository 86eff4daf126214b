//! Configuration management for Ising simulations
//!
//! The YAML file maps onto [`Config`], whose sections all have optional
//! fields filled by `with_defaults`. Command-line overrides are applied on
//! top, and [`Config::validate`] turns the result into a typed [`RunConfig`]
//! before anything is simulated.

mod args;

pub use args::Args;

use crate::error::{IsingError, Result};
use crate::ising::lattice::{LatticeBasis, MAX_HALF_WIDTH};
use crate::ising::metropolis::MetropolisParams;
use crate::ising::spins::InitialState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure, as read from YAML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub lattice: LatticeParams,
    #[serde(default)]
    pub model: ModelParams,
    #[serde(default)]
    pub monte_carlo: MonteCarloParams,
    #[serde(default)]
    pub output: OutputParams,
    pub scan: Option<ScanParams>,
}

/// Lattice geometry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LatticeParams {
    /// N: sites run over [-N, N] in both directions
    pub half_width: Option<i64>,
    /// Length of the basis vectors (layout only)
    pub lattice_constant: Option<f64>,
    /// Angle between the basis vectors in degrees (layout only)
    pub angle_degrees: Option<f64>,
}

impl Default for LatticeParams {
    fn default() -> Self {
        LatticeParams {
            half_width: Some(25),
            lattice_constant: Some(2.866),
            angle_degrees: Some(90.0),
        }
    }
}

impl LatticeParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.half_width.is_none() {
            self.half_width = defaults.half_width;
        }
        if self.lattice_constant.is_none() {
            self.lattice_constant = defaults.lattice_constant;
        }
        if self.angle_degrees.is_none() {
            self.angle_degrees = defaults.angle_degrees;
        }
        self
    }
}

/// Hamiltonian parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelParams {
    /// Coupling constant J
    pub coupling: Option<f64>,
    /// Thermal energy scale k_BT
    pub thermal_energy: Option<f64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            coupling: Some(1.0),
            thermal_energy: Some(1.0),
        }
    }
}

impl ModelParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.coupling.is_none() {
            self.coupling = defaults.coupling;
        }
        if self.thermal_energy.is_none() {
            self.thermal_energy = defaults.thermal_energy;
        }
        self
    }
}

/// Monte Carlo schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonteCarloParams {
    pub steps: Option<i64>,
    pub seed: Option<u64>,
    pub initial_state: Option<InitialState>,
    pub render_interval: Option<u64>,
    pub snapshot_interval: Option<u64>,
    /// Trailing fraction of the series averaged for the steady state
    pub steady_state_fraction: Option<f64>,
}

impl Default for MonteCarloParams {
    fn default() -> Self {
        MonteCarloParams {
            steps: Some(100_000),
            seed: None,
            initial_state: Some(InitialState::Random),
            render_interval: Some(500),
            snapshot_interval: Some(10_000),
            steady_state_fraction: Some(0.5),
        }
    }
}

impl MonteCarloParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.steps.is_none() {
            self.steps = defaults.steps;
        }
        if self.initial_state.is_none() {
            self.initial_state = defaults.initial_state;
        }
        if self.render_interval.is_none() {
            self.render_interval = defaults.render_interval;
        }
        if self.snapshot_interval.is_none() {
            self.snapshot_interval = defaults.snapshot_interval;
        }
        if self.steady_state_fraction.is_none() {
            self.steady_state_fraction = defaults.steady_state_fraction;
        }
        self
    }
}

/// File format written by the snapshot collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Plain-text portable bitmap, one pixel per site
    #[default]
    Pbm,
    /// XYZ site list with Cartesian positions and spins
    Xyz,
}

impl SnapshotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Pbm => "pbm",
            SnapshotFormat::Xyz => "xyz",
        }
    }
}

/// Where results go; every file is optional
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputParams {
    pub snapshot_dir: Option<String>,
    pub snapshot_format: Option<SnapshotFormat>,
    /// CSV of the magnetization series
    pub series_file: Option<String>,
    /// CSV of the Onsager magnetization curve
    pub theory_file: Option<String>,
    /// CSV of temperature scan results
    pub scan_file: Option<String>,
}

/// Temperature scan over independent runs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanParams {
    pub enabled: Option<bool>,
    pub t_min: Option<f64>,
    pub t_max: Option<f64>,
    pub points: Option<usize>,
    /// Steps per temperature (default: monte_carlo.steps)
    pub steps: Option<i64>,
}

impl Default for ScanParams {
    fn default() -> Self {
        ScanParams {
            enabled: Some(false),
            t_min: Some(1.0),
            t_max: Some(4.0),
            points: Some(16),
            steps: None,
        }
    }
}

impl ScanParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.t_min.is_none() {
            self.t_min = defaults.t_min;
        }
        if self.t_max.is_none() {
            self.t_max = defaults.t_max;
        }
        if self.points.is_none() {
            self.points = defaults.points;
        }
        self
    }
}

/// Validated run configuration consumed by the simulation core
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub half_width: i32,
    pub basis: LatticeBasis,
    pub params: MetropolisParams,
    pub seed: Option<u64>,
    pub initial_state: InitialState,
    pub steady_state_fraction: f64,
    pub output: OutputSettings,
    /// Present when a temperature scan was requested
    pub scan: Option<ScanSettings>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSettings {
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_format: SnapshotFormat,
    pub series_file: Option<PathBuf>,
    pub theory_file: Option<PathBuf>,
    pub scan_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSettings {
    pub t_min: f64,
    pub t_max: f64,
    pub points: usize,
    pub steps: u64,
}

impl Config {
    /// Parse a YAML document and fill in defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config = serde_yml::from_str::<Config>(content)
            .map_err(|e| IsingError::Config(format!("failed to parse YAML: {e}")))?;
        Ok(config.with_defaults())
    }

    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.lattice = self.lattice.with_defaults();
        self.model = self.model.with_defaults();
        self.monte_carlo = self.monte_carlo.with_defaults();
        if self.output.snapshot_format.is_none() {
            self.output.snapshot_format = Some(SnapshotFormat::default());
        }
        if let Some(scan) = self.scan.take() {
            self.scan = Some(scan.with_defaults());
        }
        self
    }

    /// Command-line values take precedence over the file
    pub fn with_overrides(mut self, args: &Args) -> Self {
        if args.half_width.is_some() {
            self.lattice.half_width = args.half_width;
        }
        if args.coupling.is_some() {
            self.model.coupling = args.coupling;
        }
        if args.thermal_energy.is_some() {
            self.model.thermal_energy = args.thermal_energy;
        }
        if args.steps.is_some() {
            self.monte_carlo.steps = args.steps;
        }
        if args.seed.is_some() {
            self.monte_carlo.seed = args.seed;
        }
        if args.render_interval.is_some() {
            self.monte_carlo.render_interval = args.render_interval;
        }
        if args.snapshot_interval.is_some() {
            self.monte_carlo.snapshot_interval = args.snapshot_interval;
        }
        if args.snapshot_dir.is_some() {
            self.output.snapshot_dir = args.snapshot_dir.clone();
        }
        if args.scan {
            let mut scan = self.scan.take().unwrap_or_default().with_defaults();
            scan.enabled = Some(true);
            self.scan = Some(scan);
        }
        self
    }

    /// Check every parameter and build the run configuration
    pub fn validate(&self) -> Result<RunConfig> {
        let defaults = Config::default().with_defaults();

        let half_width = self
            .lattice
            .half_width
            .or(defaults.lattice.half_width)
            .unwrap_or(0);
        if half_width < 0 {
            return Err(IsingError::Config(format!(
                "lattice half width must be non-negative, got {half_width}"
            )));
        }
        if half_width > i64::from(MAX_HALF_WIDTH) {
            return Err(IsingError::Config(format!(
                "lattice half width {half_width} exceeds the maximum of {MAX_HALF_WIDTH}"
            )));
        }
        let half_width = half_width as i32;

        let lattice_constant = self
            .lattice
            .lattice_constant
            .or(defaults.lattice.lattice_constant)
            .unwrap_or(1.0);
        if !(lattice_constant > 0.0 && lattice_constant.is_finite()) {
            return Err(IsingError::Config(format!(
                "lattice constant must be positive, got {lattice_constant}"
            )));
        }
        let angle = self
            .lattice
            .angle_degrees
            .or(defaults.lattice.angle_degrees)
            .unwrap_or(90.0);

        let steps = self.monte_carlo.steps.or(defaults.monte_carlo.steps).unwrap_or(0);
        if steps < 0 {
            return Err(IsingError::Config(format!(
                "number of steps must be non-negative, got {steps}"
            )));
        }

        let params = MetropolisParams {
            coupling: self.model.coupling.or(defaults.model.coupling).unwrap_or(1.0),
            thermal_energy: self
                .model
                .thermal_energy
                .or(defaults.model.thermal_energy)
                .unwrap_or(1.0),
            steps: steps as u64,
            render_interval: self.monte_carlo.render_interval.filter(|&n| n > 0),
            snapshot_interval: self.monte_carlo.snapshot_interval.filter(|&n| n > 0),
        };
        params.validate()?;

        let steady_state_fraction = self
            .monte_carlo
            .steady_state_fraction
            .or(defaults.monte_carlo.steady_state_fraction)
            .unwrap_or(0.5);
        if !(steady_state_fraction > 0.0 && steady_state_fraction <= 1.0) {
            return Err(IsingError::Config(format!(
                "steady state fraction must lie in (0, 1], got {steady_state_fraction}"
            )));
        }

        let scan = match &self.scan {
            Some(scan) if scan.enabled.unwrap_or(false) => Some(validate_scan(scan, steps as u64)?),
            _ => None,
        };

        Ok(RunConfig {
            half_width,
            basis: LatticeBasis::new(lattice_constant, angle),
            params,
            seed: self.monte_carlo.seed,
            initial_state: self.monte_carlo.initial_state.unwrap_or_default(),
            steady_state_fraction,
            output: OutputSettings {
                snapshot_dir: self.output.snapshot_dir.as_ref().map(PathBuf::from),
                snapshot_format: self.output.snapshot_format.unwrap_or_default(),
                series_file: self.output.series_file.as_ref().map(PathBuf::from),
                theory_file: self.output.theory_file.as_ref().map(PathBuf::from),
                scan_file: self.output.scan_file.as_ref().map(PathBuf::from),
            },
            scan,
        })
    }
}

fn validate_scan(scan: &ScanParams, default_steps: u64) -> Result<ScanSettings> {
    let defaults = ScanParams::default();
    let t_min = scan.t_min.or(defaults.t_min).unwrap_or(1.0);
    let t_max = scan.t_max.or(defaults.t_max).unwrap_or(4.0);
    let points = scan.points.or(defaults.points).unwrap_or(16);

    if !(t_min > 0.0 && t_min.is_finite()) {
        return Err(IsingError::Config(format!(
            "scan t_min must be positive, got {t_min}"
        )));
    }
    if !(t_max >= t_min && t_max.is_finite()) {
        return Err(IsingError::Config(format!(
            "scan t_max must be at least t_min ({t_min}), got {t_max}"
        )));
    }
    if points == 0 {
        return Err(IsingError::Config(
            "scan needs at least one temperature point".to_string(),
        ));
    }

    let steps = match scan.steps {
        Some(steps) if steps < 1 => {
            return Err(IsingError::Config(format!(
                "scan steps must be positive, got {steps}"
            )))
        }
        Some(steps) => steps as u64,
        None => default_steps,
    };
    if steps == 0 {
        return Err(IsingError::Config(
            "scan needs a positive number of steps".to_string(),
        ));
    }

    Ok(ScanSettings {
        t_min,
        t_max,
        points,
        steps,
    })
}
