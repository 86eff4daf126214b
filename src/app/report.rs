use crate::config::RunConfig;
use crate::ising::analysis::{
    critical_temperature, energy_per_site_at_zero_temp, onsager_magnetization,
};
use crate::ising::{MetropolisEngine, ScanPoint};
use color_eyre::eyre::{Result, WrapErr};
use rand::Rng;
use tracing::info;

pub fn report_run_summary<R: Rng>(config: &RunConfig, engine: &MetropolisEngine<R>) -> Result<()> {
    let summary = engine.summary();
    let params = engine.params();
    info!("\nMetropolis run finished.");
    info!(
        "  Steps: {}, accepted: {} ({:.2}%)",
        summary.steps,
        summary.accepted,
        100.0 * summary.acceptance_rate()
    );
    info!("  Final magnetization: {:+.6}", summary.final_magnetization);
    info!(
        "  Energy per site: {:.6} (ground state {:.6})",
        summary.energy_per_site,
        energy_per_site_at_zero_temp(params.coupling)
    );

    let series = engine.series();
    if series.is_empty() {
        info!("No steps were run; skipping steady-state averages");
    } else {
        let fraction = config.steady_state_fraction;
        let mean = series
            .trailing_mean(fraction)
            .wrap_err("Unable to average the magnetization series")?;
        let abs_mean = series.trailing_abs_mean(fraction)?;
        let std_dev = series.trailing_std_dev(fraction)?;
        info!(
            "\nAverage magnetization over the last {:.0}% of steps: {:+.3} (|M| = {:.3}, std {:.3})",
            100.0 * fraction,
            mean,
            abs_mean,
            std_dev
        );
    }

    report_theory(params.coupling, params.thermal_energy);
    Ok(())
}

fn report_theory(coupling: f64, thermal_energy: f64) {
    let tc = critical_temperature(coupling);
    info!("Theoretical Curie temperature: k_B T_c = {:.3}", tc);
    info!(
        "Onsager magnetization at k_BT = {:.3}: {:.3}",
        thermal_energy,
        onsager_magnetization(thermal_energy, coupling)
    );
}

pub fn report_scan(points: &[ScanPoint], coupling: f64) {
    info!("\nTemperature scan finished.");
    info!(
        "  {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "k_BT", "<M>", "<|M|>", "std", "accept", "Onsager"
    );
    for p in points {
        info!(
            "  {:>8.4} {:>+10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            p.thermal_energy,
            p.magnetization,
            p.abs_magnetization,
            p.std_dev,
            p.acceptance_rate,
            p.theory
        );
    }
    info!(
        "Theoretical Curie temperature: k_B T_c = {:.3}",
        critical_temperature(coupling)
    );
}
