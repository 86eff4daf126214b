//! Error types shared by the simulation core

use thiserror::Error;

/// Errors raised by the Ising simulation core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsingError {
    /// Run parameters rejected before the simulation starts
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Lattice bookkeeping is inconsistent; the run must not continue
    #[error("Internal invariant violated: {0}")]
    Invariant(String),

    /// Reduction over the magnetization series is not defined
    #[error("Observable error: {0}")]
    Observable(String),
}

pub type Result<T> = std::result::Result<T, IsingError>;
