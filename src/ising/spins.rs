use crate::error::{IsingError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the spin array is filled before the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialState {
    /// Independent random sign per site
    #[default]
    Random,
    /// All spins `+1`
    Up,
    /// All spins `-1`
    Down,
}

impl InitialState {
    pub fn build<R: Rng + ?Sized>(self, n_sites: usize, rng: &mut R) -> SpinState {
        match self {
            InitialState::Random => SpinState::random(n_sites, rng),
            InitialState::Up => SpinState::from_valid(vec![1; n_sites]),
            InitialState::Down => SpinState::from_valid(vec![-1; n_sites]),
        }
    }
}

/// Per-site spin values, indexed by site index.
///
/// The running sum is kept up to date on every flip so the mean is O(1).
/// Only the Metropolis engine flips spins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinState {
    spins: Vec<i8>,
    total: i64,
}

impl SpinState {
    /// Every site independently `+1` or `-1` with probability 1/2
    pub fn random<R: Rng + ?Sized>(n_sites: usize, rng: &mut R) -> Self {
        let spins: Vec<i8> = (0..n_sites)
            .map(|_| if rng.gen_bool(0.5) { 1 } else { -1 })
            .collect();
        Self::from_valid(spins)
    }

    /// Fully ordered configuration
    pub fn uniform(n_sites: usize, spin: i8) -> Result<Self> {
        Self::from_spins(vec![spin; n_sites])
    }

    pub fn from_spins(spins: Vec<i8>) -> Result<Self> {
        if let Some(pos) = spins.iter().position(|&s| s != 1 && s != -1) {
            return Err(IsingError::Config(format!(
                "spin at site {pos} is {}, expected +1 or -1",
                spins[pos]
            )));
        }
        Ok(Self::from_valid(spins))
    }

    fn from_valid(spins: Vec<i8>) -> Self {
        let total = spins.iter().map(|&s| s as i64).sum();
        Self { spins, total }
    }

    #[inline]
    pub fn get(&self, index: usize) -> i8 {
        self.spins[index]
    }

    #[inline]
    pub(crate) fn flip(&mut self, index: usize) {
        let s = &mut self.spins[index];
        self.total -= 2 * *s as i64;
        *s = -*s;
    }

    /// Sum of all spins
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Arithmetic mean over all sites (the magnetization per site)
    pub fn mean(&self) -> f64 {
        if self.spins.is_empty() {
            return 0.0;
        }
        self.total as f64 / self.spins.len() as f64
    }

    pub fn len(&self) -> usize {
        self.spins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.spins
    }
}
