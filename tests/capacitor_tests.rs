use dogma::capacitor::{
    consumption_rate, peak_recharge, recharge_at, simulate, CapState, CapacitorConsumer,
};
use dogma::config::CapacitorConfig;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn percent(state: CapState) -> f64 {
    match state {
        CapState::Stable { percent } => percent,
        other => panic!("expected a stable capacitor, got {other:?}"),
    }
}

fn seconds(state: CapState) -> f64 {
    match state {
        CapState::Depletes { seconds } => seconds,
        other => panic!("expected a depleting capacitor, got {other:?}"),
    }
}

#[test]
fn drain_equal_to_peak_settles_at_quarter() {
    let consumers = [CapacitorConsumer::new(500.0, 10.0)];
    approx_eq(peak_recharge(5000.0, 250.0), 50.0, 1e-9);
    approx_eq(consumption_rate(&consumers), 50.0, 1e-12);

    let state = simulate(5000.0, 250_000.0, &consumers, &CapacitorConfig::default());
    approx_eq(percent(state), 25.0, 1e-6);
}

#[test]
fn light_drain_settles_on_upper_root() {
    let consumers = [CapacitorConsumer::new(300.0, 10.0)];
    let state = simulate(5000.0, 250_000.0, &consumers, &CapacitorConfig::default());

    // 200·(√x − x) = 30  ⇒  √x = (1 + √0.4) / 2
    let root = (1.0 + 0.4_f64.sqrt()) / 2.0;
    approx_eq(percent(state), root * root * 100.0, 1e-6);
    approx_eq(recharge_at(5000.0, 250.0, root * root), 30.0, 1e-9);
}

#[test]
fn stable_level_drops_as_drain_rises() {
    let config = CapacitorConfig::default();
    let mut previous = 100.0;
    for amount in [50.0, 150.0, 300.0, 450.0, 500.0] {
        let state = simulate(5000.0, 250_000.0, &[CapacitorConsumer::new(amount, 10.0)], &config);
        let level = percent(state);
        assert!(level < previous, "level rose at drain {amount}");
        assert!(level >= 25.0 - 1e-6);
        previous = level;
    }
}

#[test]
fn heavy_drain_depletes_close_to_analytic_time() {
    let (capacity, tau, drain) = (10_000.0, 1000.0, 40.0);
    let consumers = [CapacitorConsumer::new(400.0, 10.0)];
    let state = simulate(capacity, tau * 1000.0, &consumers, &CapacitorConfig::default());
    let simulated = seconds(state);

    // t = ∫ C dx / (D − recharge(x)) from 0 to 1, by midpoint rule.
    let steps = 100_000;
    let dx = 1.0 / steps as f64;
    let expected: f64 = (0..steps)
        .map(|i| {
            let x = (i as f64 + 0.5) * dx;
            capacity * dx / (drain - recharge_at(capacity, tau, x))
        })
        .sum();

    assert!(
        (simulated - expected).abs() / expected < 0.05,
        "simulated {simulated}, analytic {expected}"
    );
}

#[test]
fn finer_steps_do_not_change_depletion_much() {
    let consumers = [CapacitorConsumer::new(400.0, 10.0)];
    let coarse = simulate(10_000.0, 1_000_000.0, &consumers, &CapacitorConfig::default());
    let fine = simulate(
        10_000.0,
        1_000_000.0,
        &consumers,
        &CapacitorConfig {
            time_step_secs: 0.1,
            ..CapacitorConfig::default()
        },
    );
    let (coarse, fine) = (seconds(coarse), seconds(fine));
    assert!((coarse - fine).abs() / fine < 0.02);
}

#[test]
fn outlasting_the_horizon_counts_as_stable() {
    let consumers = [CapacitorConsumer::new(400.0, 10.0)];
    let config = CapacitorConfig {
        time_step_secs: 1.0,
        horizon_secs: 10.0,
    };
    let state = simulate(10_000.0, 1_000_000.0, &consumers, &config);
    let level = percent(state);
    assert!(level < 100.0 && level > 90.0, "level {level}");
}

#[test]
fn zero_recharge_time_drains_at_full_rate() {
    let consumers = [CapacitorConsumer::new(100.0, 1.0)];
    let state = simulate(1000.0, 0.0, &consumers, &CapacitorConfig::default());
    approx_eq(seconds(state), 10.0, 1e-9);
}
