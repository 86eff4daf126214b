// Main library file for Ising Monte Carlo simulations

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod ising;

pub use error::{IsingError, Result};
