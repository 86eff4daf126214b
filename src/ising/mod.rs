pub mod analysis;
pub mod hook;
pub mod lattice;
pub mod metropolis;
pub mod observables;
pub mod scan;
pub mod spins;

pub use hook::{NoopHook, SnapshotHook, SpinView};
pub use lattice::{Coordinate, Lattice, LatticeBasis};
pub use metropolis::{MetropolisEngine, MetropolisParams, RunSummary, StepOutcome};
pub use observables::MagnetizationSeries;
pub use scan::{ScanPoint, TemperatureScan};
pub use spins::{InitialState, SpinState};

#[cfg(test)]
mod tests;
