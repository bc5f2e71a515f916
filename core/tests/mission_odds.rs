//! The mission lottery: real launchers against the failure entity.

use smp_core::{
    config::GameConfig,
    engine::{draw_mission_winner, failure_weight},
    rng::{PhaseRng, PhaseSlot},
};

/// One launcher with 20 tech in round 1:
/// failure weight 0.1 * 0.98 * 20 = 1.96, win chance 20 / 21.96 = 0.911.
#[test]
fn single_launcher_win_rate_converges() {
    let config = GameConfig::default();
    let weight = failure_weight(&config, 1, 20);
    assert!((weight - 1.96).abs() < 1e-9);

    let expected = 20.0 / (20.0 + weight);
    let mut rng = PhaseRng::new(0x5EED, PhaseSlot::Mission as u64);
    let trials = 40_000;
    let wins = (0..trials)
        .filter(|_| draw_mission_winner(&mut rng, &[20], weight) == Some(0))
        .count();
    let rate = wins as f64 / trials as f64;
    assert!(
        (rate - expected).abs() < 0.01,
        "empirical win rate {rate:.4} too far from {expected:.4}"
    );
}

#[test]
fn failure_risk_decays_with_rounds() {
    let config = GameConfig::default();
    let early = failure_weight(&config, 1, 100);
    let late = failure_weight(&config, 50, 100);
    assert!(late < early);
    assert!((late / early - 0.98f64.powi(49)).abs() < 1e-9);
}

#[test]
fn win_chance_is_proportional_to_tech() {
    let mut rng = PhaseRng::new(77, PhaseSlot::Mission as u64);
    let trials = 30_000;
    let mut tally = [0usize; 3];
    for _ in 0..trials {
        match draw_mission_winner(&mut rng, &[30, 10], 0.0) {
            Some(ix) => tally[ix] += 1,
            None => tally[2] += 1,
        }
    }
    assert_eq!(tally[2], 0, "no failure mass means no failures");
    let share = tally[0] as f64 / trials as f64;
    assert!((share - 0.75).abs() < 0.015, "share {share}");
}
