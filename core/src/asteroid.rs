//! The asteroid discovered each round and its mining payoff model.
//!
//!   payoff = base_reward + upside + floor(sqrt(max(0, 1.5 * tech_spend)))
//!
//! base_reward and upside are independent log-normal draws scaled by
//! `reward_scale`. The square-root term rewards aggregate investment with
//! diminishing returns.

use crate::{rng::PhaseRng, types::{Money, Tech}};
use serde::{Deserialize, Serialize};

/// Weight of the invested-technology term.
pub const TECH_PAYOFF_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub base_reward: Money,
    pub reward_scale: f64,
}

impl Asteroid {
    /// Discover a new asteroid. Lives for exactly one round.
    pub fn discover(rng: &mut PhaseRng, reward_scale: f64) -> Self {
        Self {
            base_reward: skewed_reward(rng, reward_scale),
            reward_scale,
        }
    }

    /// An asteroid with a known base reward.
    pub fn with_base_reward(base_reward: Money, reward_scale: f64) -> Self {
        Self { base_reward, reward_scale }
    }

    /// Mining payoff for the given total of invested technology.
    pub fn payoff(&self, tech_spend: Tech, rng: &mut PhaseRng) -> Money {
        let upside = skewed_reward(rng, self.reward_scale);
        self.base_reward + upside + tech_bonus(tech_spend)
    }
}

/// floor(sqrt(max(0, 1.5 * tech_spend)))
pub fn tech_bonus(tech_spend: Tech) -> Money {
    (TECH_PAYOFF_FACTOR * tech_spend as f64).max(0.0).sqrt().floor() as Money
}

fn skewed_reward(rng: &mut PhaseRng, scale: f64) -> Money {
    (rng.lognormal(0.0, 1.0) * scale).floor() as Money
}
