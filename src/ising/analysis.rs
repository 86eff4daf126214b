//! Exact results for the 2D square-lattice Ising model, used to put
//! simulation output next to theory.

/// Critical temperature of the 2D model (Onsager)
/// k_B T_c = 2J / ln(1 + √2) ≈ 2.269 J
pub fn critical_temperature(coupling: f64) -> f64 {
    2.0 * coupling / (1.0 + 2.0_f64.sqrt()).ln()
}

/// Spontaneous magnetization per site in the thermodynamic limit (Onsager/Yang)
/// M(T) = (1 - sinh(2J / k_B T)^-4)^(1/8) below T_c, zero above
pub fn onsager_magnetization(thermal_energy: f64, coupling: f64) -> f64 {
    if thermal_energy <= 0.0 {
        return magnetization_at_zero_temp();
    }
    if thermal_energy > critical_temperature(coupling) {
        return 0.0;
    }
    let s = (2.0 * coupling / thermal_energy).sinh();
    // rounding near T_c can push the base a hair below zero
    (1.0 - s.powi(-4)).max(0.0).powf(0.125)
}

/// Onsager magnetization sampled at `points` evenly spaced temperatures
/// in `[t_min, t_max]`, as `(k_B T, M)` pairs
pub fn theoretical_curve(t_min: f64, t_max: f64, points: usize, coupling: f64) -> Vec<(f64, f64)> {
    linspace(t_min, t_max, points)
        .into_iter()
        .map(|t| (t, onsager_magnetization(t, coupling)))
        .collect()
}

/// `points` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|k| start + k as f64 * step).collect()
        }
    }
}

/// Nearest neighbors per site on the square lattice
pub fn coordination_number() -> usize {
    4
}

/// Magnetization per site at T = 0 (all spins aligned)
pub fn magnetization_at_zero_temp() -> f64 {
    1.0
}

/// Energy per site at T = 0: each spin has 4 aligned neighbors,
/// E = -J * 4 / 2 = -2J per site
pub fn energy_per_site_at_zero_temp(coupling: f64) -> f64 {
    -(coordination_number() as f64) / 2.0 * coupling
}
