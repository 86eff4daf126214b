use super::metropolis::{acceptance_probability, metropolis_accept};
use super::*;
use crate::config::Config;
use crate::error::IsingError;
use approx::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_engine(
    half_width: i32,
    coupling: f64,
    thermal_energy: f64,
    steps: u64,
    seed: u64,
) -> MetropolisEngine<StdRng> {
    let mut rng = StdRng::seed_from_u64(seed);
    let lattice = Lattice::new(half_width).unwrap();
    let spins = SpinState::random(lattice.n_sites(), &mut rng);
    let params = MetropolisParams::new(coupling, thermal_energy, steps);
    MetropolisEngine::new(lattice, spins, params, rng).unwrap()
}

fn ordered_engine(half_width: i32, thermal_energy: f64, steps: u64) -> MetropolisEngine<StdRng> {
    let lattice = Lattice::new(half_width).unwrap();
    let spins = SpinState::uniform(lattice.n_sites(), 1).unwrap();
    let params = MetropolisParams::new(1.0, thermal_energy, steps);
    MetropolisEngine::new(lattice, spins, params, StdRng::seed_from_u64(1)).unwrap()
}

#[derive(Default)]
struct RecordingHook {
    renders: Vec<(u64, f64)>,
    persists: Vec<(u64, Vec<Vec<i8>>)>,
}

impl SnapshotHook for RecordingHook {
    fn render(&mut self, view: &SpinView<'_>) {
        self.renders.push((view.step(), view.magnetization()));
    }

    fn persist(&mut self, view: &SpinView<'_>) {
        self.persists.push((view.step(), view.to_grid()));
    }
}

#[test]
fn test_series_length_and_bounds() {
    let mut engine = seeded_engine(2, 1.0, 2.0, 1000, 5);
    let summary = engine.run(&mut NoopHook);

    assert_eq!(summary.steps, 1000);
    assert_eq!(engine.series().len(), 1000);
    assert!(engine
        .series()
        .series()
        .iter()
        .all(|m| (-1.0..=1.0).contains(m)));
    assert_eq!(engine.series().last(), Some(summary.final_magnetization));
    assert!((0.0..=1.0).contains(&summary.acceptance_rate()));
}

#[test]
fn test_rejected_steps_leave_state_untouched() {
    let mut engine = seeded_engine(3, 1.0, 1.5, 2000, 17);
    let mut rejected = 0;

    for _ in 0..2000 {
        let before = engine.spins().clone();
        let prior: Vec<f64> = engine.series().series().to_vec();

        let outcome = engine.step(&mut NoopHook);
        let series = engine.series().series();
        assert_eq!(&series[..prior.len()], prior.as_slice());

        if outcome.accepted {
            assert_eq!(engine.spins().get(outcome.site), -before.get(outcome.site));
        } else {
            rejected += 1;
            assert_eq!(engine.spins(), &before);
            assert_eq!(series[prior.len()], before.mean());
        }
    }
    assert!(rejected > 0);
}

#[test]
fn test_frozen_ordered_state() {
    // every flip costs 8J, exp(-8000) underflows to zero
    let mut engine = ordered_engine(2, 1e-3, 200);
    let start = engine.spins().clone();

    for _ in 0..200 {
        let outcome = engine.step(&mut NoopHook);
        assert!(!outcome.accepted);
        assert_eq!(outcome.delta_e, 8.0);
    }

    assert_eq!(engine.spins(), &start);
    assert_eq!(engine.accepted_count(), 0);
    assert!(engine.series().series().iter().all(|&m| m == 1.0));
    assert_eq!(engine.series().trailing_mean(0.5).unwrap(), 1.0);
}

#[test]
fn test_non_increasing_moves_always_accepted() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..1000 {
        assert!(metropolis_accept(0.0, 1.0, &mut rng));
        assert!(metropolis_accept(-4.0, 0.1, &mut rng));
    }
    assert_eq!(acceptance_probability(0.0, 1.0), 1.0);
    assert_eq!(acceptance_probability(-8.0, 1.0), 1.0);

    // no uniform is drawn for a non-increasing move
    let mut a = StdRng::seed_from_u64(3);
    let mut b = a.clone();
    metropolis_accept(0.0, 1.0, &mut a);
    assert_eq!(a.gen::<u64>(), b.gen::<u64>());
}

#[test]
fn test_acceptance_frequency_matches_boltzmann_factor() {
    let mut rng = StdRng::seed_from_u64(2024);
    let trials = 200_000;

    for &(delta_e, thermal_energy) in &[(1.0, 1.0), (4.0, 2.0), (8.0, 2.269)] {
        let accepted = (0..trials)
            .filter(|_| metropolis_accept(delta_e, thermal_energy, &mut rng))
            .count();
        let frequency = accepted as f64 / trials as f64;
        let expected = acceptance_probability(delta_e, thermal_energy);
        assert_relative_eq!(frequency, expected, epsilon = 0.01);
    }
}

#[test]
fn test_single_site_lattice() {
    let lattice = Lattice::new(0).unwrap();
    assert_eq!(*lattice.neighbors_at(0), [0, 0, 0, 0]);

    // ferromagnetic: flipping the lone spin always costs 8J
    let mut engine = seeded_engine(0, 1.0, 1.0, 100, 8);
    for _ in 0..100 {
        let outcome = engine.step(&mut NoopHook);
        assert_eq!(outcome.site, 0);
        assert_eq!(outcome.delta_e, 8.0);
    }

    // negative coupling: always -8J, so the spin flips every step
    let mut engine = seeded_engine(0, -1.0, 1.0, 10, 8);
    let mut previous = engine.spins().get(0);
    for _ in 0..10 {
        let outcome = engine.step(&mut NoopHook);
        assert_eq!(outcome.delta_e, -8.0);
        assert!(outcome.accepted);
        assert_eq!(engine.spins().get(0), -previous);
        previous = engine.spins().get(0);
    }
}

#[test]
fn test_seeded_run_is_deterministic() {
    let mut first = seeded_engine(1, 1.0, 2.0, 10, 31337);
    let mut second = seeded_engine(1, 1.0, 2.0, 10, 31337);

    let a: Vec<StepOutcome> = (0..10).map(|_| first.step(&mut NoopHook)).collect();
    let b: Vec<StepOutcome> = (0..10).map(|_| second.step(&mut NoopHook)).collect();

    assert_eq!(a, b);
    assert_eq!(first.spins(), second.spins());
    assert_eq!(first.series(), second.series());
}

/// Straightforward rendition with a linear neighbor search, fed the same stream
fn linear_scan_reference(
    n: i32,
    coupling: f64,
    thermal_energy: f64,
    steps: usize,
    seed: u64,
) -> (Vec<bool>, Vec<i8>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let coords: Vec<(i32, i32)> = (-n..=n).flat_map(|i| (-n..=n).map(move |j| (i, j))).collect();
    let nn = coords.len();
    let mut s: Vec<i8> = (0..nn)
        .map(|_| if rng.gen_bool(0.5) { 1 } else { -1 })
        .collect();
    let wrap = |x: i32| if x > n { -n } else if x < -n { n } else { x };
    let find = |c: (i32, i32)| coords.iter().position(|&x| x == c).unwrap();

    let mut accepted = Vec::new();
    let mut m = Vec::new();
    for _ in 0..steps {
        let idx = rng.gen_range(0..nn);
        let (i, j) = coords[idx];
        let sum = s[find((wrap(i + 1), j))] as i32
            + s[find((wrap(i - 1), j))] as i32
            + s[find((i, wrap(j + 1)))] as i32
            + s[find((i, wrap(j - 1)))] as i32;
        let delta_e = 2.0 * coupling * (s[idx] as i32 * sum) as f64;

        let accept = delta_e <= 0.0 || rng.gen::<f64>() < (-delta_e / thermal_energy).exp();
        if accept {
            s[idx] = -s[idx];
        }
        accepted.push(accept);
        m.push(s.iter().map(|&x| x as f64).sum::<f64>() / nn as f64);
    }
    (accepted, s, m)
}

#[test]
fn test_matches_linear_scan_reference() {
    for &(n, steps, seed, thermal_energy) in &[(1, 10, 7u64, 1.0), (1, 10, 42, 3.0), (4, 5000, 11, 2.269)] {
        let (accepted, spins, series) = linear_scan_reference(n, 1.0, thermal_energy, steps, seed);

        let mut engine = seeded_engine(n, 1.0, thermal_energy, steps as u64, seed);
        let outcomes: Vec<bool> = (0..steps).map(|_| engine.step(&mut NoopHook).accepted).collect();

        assert_eq!(outcomes, accepted);
        assert_eq!(engine.spins().as_slice(), spins.as_slice());
        assert_eq!(engine.series().series(), series.as_slice());
    }
}

#[test]
fn test_hooks_called_at_intervals() {
    let mut engine = seeded_engine(1, 1.0, 2.0, 12, 4);
    let mut params = *engine.params();
    params.render_interval = Some(3);
    params.snapshot_interval = Some(5);
    let lattice = engine.lattice().clone();
    let spins = engine.spins().clone();
    engine = MetropolisEngine::new(lattice, spins, params, StdRng::seed_from_u64(4)).unwrap();

    let mut hook = RecordingHook::default();
    engine.run(&mut hook);

    let render_steps: Vec<u64> = hook.renders.iter().map(|r| r.0).collect();
    let persist_steps: Vec<u64> = hook.persists.iter().map(|p| p.0).collect();
    assert_eq!(render_steps, vec![0, 3, 6, 9]);
    assert_eq!(persist_steps, vec![0, 5, 10]);

    for &(step, m) in &hook.renders {
        assert_eq!(m, engine.series().series()[step as usize]);
    }
    for (_, grid) in &hook.persists {
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|row| row.len() == 3));
    }
}

#[test]
fn test_disabled_hooks_never_fire() {
    let mut engine = seeded_engine(2, 1.0, 2.0, 50, 4);
    let mut hook = RecordingHook::default();
    engine.run(&mut hook);
    assert!(hook.renders.is_empty());
    assert!(hook.persists.is_empty());
}

#[test]
fn test_energy_of_single_flip() {
    let ordered = ordered_engine(2, 1.0, 0);
    assert_relative_eq!(ordered.energy_per_site(), -2.0, epsilon = 1e-12);

    let center = ordered.lattice().index_of(Coordinate::new(0, 0)).unwrap();
    assert_eq!(ordered.delta_energy(center), 8.0);

    let mut spins = vec![1i8; ordered.lattice().n_sites()];
    spins[center] = -1;
    let flipped = MetropolisEngine::new(
        ordered.lattice().clone(),
        SpinState::from_spins(spins).unwrap(),
        *ordered.params(),
        StdRng::seed_from_u64(0),
    )
    .unwrap();

    assert_relative_eq!(
        flipped.total_energy() - ordered.total_energy(),
        8.0,
        epsilon = 1e-10
    );
    assert_eq!(flipped.delta_energy(center), -8.0);
}

#[test]
fn test_mismatched_spin_count() {
    let lattice = Lattice::new(1).unwrap();
    let spins = SpinState::uniform(4, 1).unwrap();
    let params = MetropolisParams::new(1.0, 1.0, 10);
    let err = MetropolisEngine::new(lattice, spins, params, StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(err, IsingError::Invariant(_)));
}

#[test]
fn test_invalid_temperature_rejected() {
    let lattice = Lattice::new(1).unwrap();
    let spins = SpinState::uniform(9, 1).unwrap();
    for &t in &[0.0, -1.0, f64::NAN] {
        let params = MetropolisParams::new(1.0, t, 10);
        let result = MetropolisEngine::new(lattice.clone(), spins.clone(), params, StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(IsingError::Config(_))));
    }
}

#[test]
fn test_low_temperature_stays_ordered() {
    let mut engine = ordered_engine(5, 1.0, 20_000);
    engine.run(&mut NoopHook);
    assert!(engine.series().trailing_mean(0.5).unwrap() > 0.9);
}

#[test]
fn test_high_temperature_disorders() {
    let mut engine = seeded_engine(5, 1.0, 10.0, 50_000, 77);
    engine.run(&mut NoopHook);
    assert!(engine.series().trailing_mean(0.5).unwrap().abs() < 0.3);
    assert!(engine.summary().acceptance_rate() > 0.5);
}

#[test]
fn test_from_config_is_reproducible() {
    let yaml = "lattice:\n  half_width: 2\nmonte_carlo:\n  steps: 300\n  seed: 12\n";
    let run = Config::from_yaml_str(yaml).unwrap().validate().unwrap();

    let mut first = MetropolisEngine::from_config(&run).unwrap();
    let mut second = MetropolisEngine::from_config(&run).unwrap();
    first.run(&mut NoopHook);
    second.run(&mut NoopHook);

    assert_eq!(first.step_count(), 300);
    assert_eq!(first.spins(), second.spins());
    assert_eq!(first.into_series(), second.into_series());
}

#[test]
fn test_temperature_scan() {
    let scan = TemperatureScan {
        half_width: 2,
        coupling: 1.0,
        temperatures: vec![1.0, 2.5, 4.0],
        steps: 3000,
        initial_state: InitialState::Up,
        steady_state_fraction: 0.5,
        seed: Some(5),
    };

    let points = scan.run().unwrap();
    assert_eq!(points.len(), 3);
    for (point, &t) in points.iter().zip(&scan.temperatures) {
        assert_eq!(point.thermal_energy, t);
        assert!((0.0..=1.0).contains(&point.abs_magnetization));
        assert!(point.std_dev >= 0.0);
    }
    assert!(points[0].theory > 0.99);
    assert_eq!(points[2].theory, 0.0);
    assert!(points[0].acceptance_rate < points[2].acceptance_rate);

    // each temperature carries its own seeded stream
    assert_eq!(scan.run().unwrap(), points);
}
