use super::hook::{SnapshotHook, SpinView};
use super::lattice::{Lattice, RIGHT, UP};
use super::observables::MagnetizationSeries;
use super::spins::SpinState;
use crate::config::RunConfig;
use crate::error::{IsingError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Physical and scheduling parameters of one Metropolis run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetropolisParams {
    /// Nearest-neighbor coupling J
    pub coupling: f64,
    /// Thermal energy scale k_B T
    pub thermal_energy: f64,
    /// Number of single-spin-flip steps
    pub steps: u64,
    /// Call [`SnapshotHook::render`] every this many steps
    pub render_interval: Option<u64>,
    /// Call [`SnapshotHook::persist`] every this many steps
    pub snapshot_interval: Option<u64>,
}

impl MetropolisParams {
    pub fn new(coupling: f64, thermal_energy: f64, steps: u64) -> Self {
        Self {
            coupling,
            thermal_energy,
            steps,
            render_interval: None,
            snapshot_interval: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.coupling.is_finite() {
            return Err(IsingError::Config(format!(
                "coupling constant must be finite, got {}",
                self.coupling
            )));
        }
        if !(self.thermal_energy > 0.0 && self.thermal_energy.is_finite()) {
            return Err(IsingError::Config(format!(
                "thermal energy k_BT must be positive, got {}",
                self.thermal_energy
            )));
        }
        Ok(())
    }
}

/// What happened during a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub step: u64,
    pub site: usize,
    pub delta_e: f64,
    pub accepted: bool,
}

/// Totals reported after a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub accepted: u64,
    pub final_magnetization: f64,
    pub energy_per_site: f64,
}

impl RunSummary {
    pub fn acceptance_rate(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.accepted as f64 / self.steps as f64
        }
    }
}

/// Probability of accepting a flip with energy change `delta_e`
pub fn acceptance_probability(delta_e: f64, thermal_energy: f64) -> f64 {
    if delta_e <= 0.0 {
        1.0
    } else {
        (-delta_e / thermal_energy).exp()
    }
}

/// Metropolis criterion.
///
/// Non-increasing moves are accepted without touching the generator;
/// otherwise one uniform draw `u` in `[0, 1)` is taken and the move is
/// accepted iff `u < exp(-delta_e / k_BT)`.
pub fn metropolis_accept<R: Rng + ?Sized>(delta_e: f64, thermal_energy: f64, rng: &mut R) -> bool {
    delta_e <= 0.0 || rng.gen::<f64>() < (-delta_e / thermal_energy).exp()
}

#[inline]
fn is_due(step: u64, interval: Option<u64>) -> bool {
    matches!(interval, Some(every) if every > 0 && step % every == 0)
}

/// Single-spin-flip Metropolis dynamics on a periodic square lattice.
///
/// Owns the lattice, the spins, the magnetization series and the random
/// source, so independent engines never share state. Each step draws a site,
/// decides acceptance from the pre-step configuration, flips and records,
/// then notifies the hook.
#[derive(Debug, Clone)]
pub struct MetropolisEngine<R: Rng> {
    lattice: Lattice,
    spins: SpinState,
    series: MagnetizationSeries,
    params: MetropolisParams,
    rng: R,
    step: u64,
    accepted: u64,
}

impl MetropolisEngine<StdRng> {
    /// Engine seeded from the configuration, or from entropy without a seed
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let lattice = Lattice::new(config.half_width)?;
        let spins = config.initial_state.build(lattice.n_sites(), &mut rng);
        Self::new(lattice, spins, config.params, rng)
    }
}

impl<R: Rng> MetropolisEngine<R> {
    pub fn new(lattice: Lattice, spins: SpinState, params: MetropolisParams, rng: R) -> Result<Self> {
        params.validate()?;
        if spins.len() != lattice.n_sites() {
            return Err(IsingError::Invariant(format!(
                "spin state has {} entries but the lattice has {} sites",
                spins.len(),
                lattice.n_sites()
            )));
        }
        if lattice.n_sites() == 1 {
            warn!("Single-site lattice: the site is its own neighbor in all four directions");
        }

        let capacity = params.steps.min(1 << 24) as usize;
        Ok(Self {
            lattice,
            spins,
            series: MagnetizationSeries::with_capacity(capacity),
            params,
            rng,
            step: 0,
            accepted: 0,
        })
    }

    /// Energy change of flipping `site` in the current configuration,
    /// `2 J s_i (s_up + s_down + s_right + s_left)`
    #[inline]
    pub fn delta_energy(&self, site: usize) -> f64 {
        let s = self.spins.get(site) as i32;
        let field: i32 = self
            .lattice
            .neighbors_at(site)
            .iter()
            .map(|&n| self.spins.get(n) as i32)
            .sum();
        2.0 * self.params.coupling * (s * field) as f64
    }

    /// Perform one Monte Carlo step
    pub fn step<H: SnapshotHook + ?Sized>(&mut self, hook: &mut H) -> StepOutcome {
        let site = self.rng.gen_range(0..self.lattice.n_sites());
        let delta_e = self.delta_energy(site);
        let accepted = metropolis_accept(delta_e, self.params.thermal_energy, &mut self.rng);

        if accepted {
            self.spins.flip(site);
            self.accepted += 1;
        }
        self.series.append(self.spins.mean());

        let step = self.step;
        if is_due(step, self.params.render_interval) {
            hook.render(&self.view());
        }
        if is_due(step, self.params.snapshot_interval) {
            hook.persist(&self.view());
        }
        self.step += 1;

        StepOutcome {
            step,
            site,
            delta_e,
            accepted,
        }
    }

    /// Run the remaining steps up to the configured total
    pub fn run<H: SnapshotHook + ?Sized>(&mut self, hook: &mut H) -> RunSummary {
        info!(
            "Starting Metropolis run: {} sites (side {}), J = {}, k_BT = {}, {} steps",
            self.lattice.n_sites(),
            self.lattice.side(),
            self.params.coupling,
            self.params.thermal_energy,
            self.params.steps
        );

        while self.step < self.params.steps {
            self.step(hook);
        }

        let summary = self.summary();
        debug!(
            "Run finished after {} steps, {} accepted",
            summary.steps, summary.accepted
        );
        summary
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.step,
            accepted: self.accepted,
            final_magnetization: self.spins.mean(),
            energy_per_site: self.energy_per_site(),
        }
    }

    fn view(&self) -> SpinView<'_> {
        let step = self.step;
        SpinView::new(
            self.spins.as_slice(),
            self.lattice.side(),
            step,
            self.spins.mean(),
        )
    }

    /// Read-only view of the current grid, tagged with the next step number
    pub fn snapshot(&self) -> SpinView<'_> {
        self.view()
    }

    /// `E = -J sum_<ij> s_i s_j`, each bond counted once
    pub fn total_energy(&self) -> f64 {
        let bonds: i64 = (0..self.lattice.n_sites())
            .map(|i| {
                let nbrs = self.lattice.neighbors_at(i);
                let s = self.spins.get(i) as i64;
                s * (self.spins.get(nbrs[UP]) as i64 + self.spins.get(nbrs[RIGHT]) as i64)
            })
            .sum();
        -self.params.coupling * bonds as f64
    }

    pub fn energy_per_site(&self) -> f64 {
        self.total_energy() / self.lattice.n_sites() as f64
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn spins(&self) -> &SpinState {
        &self.spins
    }

    pub fn series(&self) -> &MagnetizationSeries {
        &self.series
    }

    pub fn params(&self) -> &MetropolisParams {
        &self.params
    }

    /// Steps completed so far
    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }

    pub fn into_series(self) -> MagnetizationSeries {
        self.series
    }
}
