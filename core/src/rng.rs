//! Deterministic random number generation.
//!
//! RULE: Nothing in the game may call a platform RNG.
//! All randomness flows through PhaseRng streams derived from the single
//! master seed of the run.
//!
//! Each engine phase owns its own stream, seeded from
//! (master_seed XOR phase_index). Reordering the strategies a player uses
//! never shifts another phase's draws.

use rand::{
    distributions::{Distribution, WeightedError, WeightedIndex},
    RngCore, SeedableRng,
};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single engine phase.
pub struct PhaseRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl PhaseRng {
    /// Create a phase RNG from the master seed and a stable phase index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, phase_index: u64) -> Self {
        let derived_seed = master_seed ^ (phase_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). Returns 0 when n is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Standard normal draw (Box–Muller).
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Log-normal draw: exp(mu + sigma * N(0, 1)). Mostly small, long right tail.
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        (mu + sigma * self.standard_normal()).exp()
    }

    /// Sample any `rand` distribution from this stream.
    pub fn sample<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        dist.sample(&mut self.inner)
    }

    /// Categorical draw. Negative and non-finite weights count as zero.
    /// Returns None when there is nothing to draw from (empty or all zero).
    pub fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let cleaned = weights
            .iter()
            .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 });
        match WeightedIndex::<f64>::new(cleaned) {
            Ok(dist) => Some(self.sample(&dist)),
            Err(WeightedError::NoItem | WeightedError::AllWeightsZero) => None,
            Err(e) => {
                log::warn!("{}: weighted draw rejected: {e}", self.name);
                None
            }
        }
    }
}

/// Stable phase slot assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum PhaseSlot {
    Asteroid = 0,
    Business = 1,
    Auction = 2,
    Mission = 3,
}

impl PhaseSlot {
    pub const ALL: [PhaseSlot; 4] = [
        PhaseSlot::Asteroid,
        PhaseSlot::Business,
        PhaseSlot::Auction,
        PhaseSlot::Mission,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Asteroid => "asteroid",
            Self::Business => "business",
            Self::Auction  => "auction",
            Self::Mission  => "mission",
        }
    }
}

/// All phase RNGs for a single run. Streams persist for the whole game.
pub struct RngBank {
    master_seed: u64,
    streams: Vec<PhaseRng>,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        let streams = PhaseSlot::ALL
            .iter()
            .map(|slot| PhaseRng::new(master_seed, *slot as u64).with_name(slot.name()))
            .collect();
        Self { master_seed, streams }
    }

    pub fn seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_phase(&mut self, slot: PhaseSlot) -> &mut PhaseRng {
        &mut self.streams[slot as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngBank::new(7);
        let mut b = RngBank::new(7);
        for _ in 0..20 {
            assert_eq!(
                a.for_phase(PhaseSlot::Auction).next_u64_below(1000),
                b.for_phase(PhaseSlot::Auction).next_u64_below(1000)
            );
        }
    }

    #[test]
    fn phases_draw_independent_streams() {
        let mut bank = RngBank::new(7);
        let business: Vec<u64> = (0..10)
            .map(|_| bank.for_phase(PhaseSlot::Business).next_u64_below(1_000_000))
            .collect();
        let auction: Vec<u64> = (0..10)
            .map(|_| bank.for_phase(PhaseSlot::Auction).next_u64_below(1_000_000))
            .collect();
        assert_ne!(business, auction);
    }

    #[test]
    fn below_respects_bound() {
        let mut rng = PhaseRng::new(1, 0);
        for _ in 0..1000 {
            assert!(rng.next_u64_below(11) < 11);
        }
        assert_eq!(rng.next_u64_below(0), 0);
    }

    #[test]
    fn lognormal_is_positive_and_skewed() {
        let mut rng = PhaseRng::new(99, 0);
        let draws: Vec<f64> = (0..5000).map(|_| rng.lognormal(0.0, 1.0)).collect();
        assert!(draws.iter().all(|d| *d > 0.0));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let mut sorted = draws.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = sorted[sorted.len() / 2];
        // Mean exp(0.5) ~ 1.65 sits well above the median of 1.0.
        assert!(mean > median, "mean {mean} should exceed median {median}");
        assert!((median - 1.0).abs() < 0.1, "median {median}");
    }

    #[test]
    fn pick_weighted_skips_zero_weights() {
        let mut rng = PhaseRng::new(3, 0);
        for _ in 0..500 {
            let ix = rng.pick_weighted(&[0.0, 2.0, 0.0, 1.0]).unwrap();
            assert!(ix == 1 || ix == 3);
        }
        assert_eq!(rng.pick_weighted(&[]), None);
        assert_eq!(rng.pick_weighted(&[0.0, 0.0]), None);
    }

    #[test]
    fn pick_weighted_ignores_unusable_weights() {
        let mut rng = PhaseRng::new(5, 0);
        for _ in 0..500 {
            assert_eq!(rng.pick_weighted(&[-3.0, f64::NAN, 4.0, f64::INFINITY]), Some(2));
        }
        assert_eq!(rng.pick_weighted(&[-1.0, f64::NAN]), None);
    }

    #[test]
    fn pick_weighted_follows_weights() {
        let mut rng = PhaseRng::new(11, 0);
        let trials = 20_000;
        let hits = (0..trials)
            .filter(|_| rng.pick_weighted(&[3.0, 1.0]) == Some(0))
            .count();
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.75).abs() < 0.02, "rate {rate}");
    }
}
