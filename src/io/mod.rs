//! Input/Output operations for Ising simulations
//!
//! This module handles logging setup, the live display and snapshot hooks,
//! and CSV export of results.

mod display;
mod output;
mod snapshot;

pub use display::{format_grid, ProgressDisplay, MAX_GRID_SIDE};
pub use output::{
    create_output_file, setup_output, write_scan_results, write_series, write_theory_curve,
};
pub use snapshot::{write_pbm, write_xyz, SnapshotWriter};
