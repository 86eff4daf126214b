use crate::config::{RunConfig, ScanSettings};
use crate::io::{ProgressDisplay, SnapshotWriter};
use crate::ising::{MetropolisEngine, ScanPoint, TemperatureScan};
use color_eyre::eyre::{Result, WrapErr};
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::info;

/// Minimum wall-clock time between two progress lines
const RENDER_PERIOD: Duration = Duration::from_millis(100);

/// Run one simulation with the progress display and, when a snapshot
/// directory is configured, the snapshot writer attached.
pub fn run_single(config: &RunConfig) -> Result<MetropolisEngine<StdRng>> {
    let mut engine =
        MetropolisEngine::from_config(config).wrap_err("Failed to set up the simulation")?;

    let display = ProgressDisplay::new(config.params.steps).with_min_period(RENDER_PERIOD);
    let snapshots = match &config.output.snapshot_dir {
        Some(dir) => {
            info!(
                "Snapshots every {:?} steps go to {}",
                config.params.snapshot_interval,
                dir.display()
            );
            let writer = SnapshotWriter::new(
                dir,
                config.output.snapshot_format,
                engine.lattice(),
                &config.basis,
            )
            .wrap_err_with(|| format!("Unable to prepare snapshot directory {}", dir.display()))?;
            Some(writer)
        }
        None => None,
    };

    let mut hook = (display, snapshots);
    engine.run(&mut hook);
    Ok(engine)
}

pub fn run_scan(config: &RunConfig, settings: &ScanSettings) -> Result<Vec<ScanPoint>> {
    let scan = TemperatureScan::from_config(config, settings);
    scan.run().wrap_err("Temperature scan failed")
}
