//! Built-in local policies.
//!
//! Each is a plain struct selected by name when a roster is resolved.
//! They read only the snapshots they are handed.

use super::{Bid, PrivateInformation, Strategy};
use crate::{error::StrategyResult, public_info::PublicInformation};

/// Names accepted by [`policy_by_name`], in display order.
pub const POLICY_NAMES: &[&str] = &[
    "sponge_bob",
    "always_launch",
    "passive_launcher",
    "aggressive_launcher",
    "observer",
    "ev_bot",
];

/// Resolve a built-in policy. Accepts snake_case or the CamelCase type name.
pub fn policy_by_name(name: &str) -> Option<Box<dyn Strategy>> {
    let key: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let strategy: Box<dyn Strategy> = match key.as_str() {
        "spongebob" => Box::new(SpongeBob),
        "alwayslaunch" | "alwayslauncher" => Box::new(AlwaysLaunch),
        "passivelauncher" => Box::new(PassiveLauncher),
        "aggressivelauncher" => Box::new(AggressiveLauncher),
        "observer" => Box::new(Observer),
        "evbot" => Box::new(EvBot),
        _ => return None,
    };
    Some(strategy)
}

/// Fixed thresholds: bids the base reward, launches with more than 10 tech,
/// joins with more than 15.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpongeBob;

impl Strategy for SpongeBob {
    fn label(&self) -> String {
        "sponge_bob".into()
    }

    fn bid(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Bid> {
        let amount = private.bankroll.min(public.base_reward.unwrap_or(0));
        Ok(Bid::new(amount, private.tech > 10))
    }

    fn join_launch(&mut self, private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<bool> {
        Ok(private.tech > 15)
    }
}

/// Never bids, always launches.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysLaunch;

impl Strategy for AlwaysLaunch {
    fn label(&self) -> String {
        "always_launch".into()
    }

    fn bid(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<Bid> {
        Ok(Bid::new(0, true))
    }

    fn join_launch(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<bool> {
        Ok(true)
    }
}

/// Lowballs just under the last winning bid and rides along on other launches.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveLauncher;

impl Strategy for PassiveLauncher {
    fn label(&self) -> String {
        "passive_launcher".into()
    }

    fn bid(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Bid> {
        let amount = private.bankroll.min(public.last_winning_bid - 1);
        Ok(Bid::new(amount, false))
    }

    fn join_launch(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<bool> {
        Ok(true)
    }
}

/// Doubles the last winning bid and launches every time.
#[derive(Debug, Default, Clone, Copy)]
pub struct AggressiveLauncher;

impl Strategy for AggressiveLauncher {
    fn label(&self) -> String {
        "aggressive_launcher".into()
    }

    fn bid(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Bid> {
        let amount = private.bankroll.min(public.last_winning_bid.saturating_mul(2));
        Ok(Bid::new(amount, true))
    }

    fn join_launch(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<bool> {
        Ok(false)
    }
}

/// Sits out. Useful for watching broadcasts until it goes broke.
#[derive(Debug, Default, Clone, Copy)]
pub struct Observer;

impl Strategy for Observer {
    fn label(&self) -> String {
        "observer".into()
    }

    fn bid(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<Bid> {
        Ok(Bid::pass())
    }

    fn join_launch(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<bool> {
        Ok(false)
    }
}

/// Bids cheap and launches when a rough expected value looks good.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvBot;

impl EvBot {
    /// Launch when the estimate clears this.
    pub const EV_THRESHOLD: f64 = 7.0;

    /// Rough EV of launching now: win chance from own tech against
    /// `n` opponents, times a payoff guess assuming ~7 tech each.
    /// The win chance is a probability, so it never exceeds 1.
    pub fn expected_value(tech: u64, n: usize, base_reward: i64) -> f64 {
        let n = n.max(1) as f64;
        let p_win = (tech as f64 / 10.0).powf(n).min(1.0);
        let payoff = base_reward as f64 + 8.0 + (1.5 * 7.0 * n).sqrt();
        p_win * payoff
    }
}

impl Strategy for EvBot {
    fn label(&self) -> String {
        "ev_bot".into()
    }

    fn bid(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Bid> {
        let amount = private.bankroll.min(2);
        let ev = Self::expected_value(
            private.tech,
            public.active_players(),
            public.base_reward.unwrap_or(0),
        );
        Ok(Bid::new(amount, ev > Self::EV_THRESHOLD))
    }

    fn join_launch(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private(tech: u64, bankroll: i64) -> PrivateInformation {
        PrivateInformation {
            name: "p".into(),
            tech,
            bankroll,
            launching: false,
            last_bid: 0,
        }
    }

    fn public(base_reward: i64, last_winning_bid: i64) -> PublicInformation {
        PublicInformation {
            base_reward: Some(base_reward),
            last_winning_bid,
            ..PublicInformation::default()
        }
    }

    #[test]
    fn every_listed_name_resolves() {
        for name in POLICY_NAMES {
            assert!(policy_by_name(name).is_some(), "{name} should resolve");
        }
        assert!(policy_by_name("SpongeBob").is_some());
        assert!(policy_by_name("AggressiveLauncher").is_some());
        assert!(policy_by_name("grandmaster").is_none());
    }

    #[test]
    fn sponge_bob_caps_bid_at_bankroll() {
        let mut s = SpongeBob;
        assert_eq!(s.bid(&private(11, 1000), &public(20, 0)).unwrap(), Bid::new(20, true));
        assert_eq!(s.bid(&private(10, 8), &public(20, 0)).unwrap(), Bid::new(8, false));
        assert!(!s.join_launch(&private(15, 0), &public(0, 0)).unwrap());
        assert!(s.join_launch(&private(16, 0), &public(0, 0)).unwrap());
    }

    #[test]
    fn passive_launcher_undercuts() {
        let mut s = PassiveLauncher;
        assert_eq!(s.bid(&private(0, 1000), &public(0, 9)).unwrap(), Bid::new(8, false));
        assert!(s.join_launch(&private(0, 0), &public(0, 0)).unwrap());
    }

    #[test]
    fn aggressive_launcher_doubles() {
        let mut s = AggressiveLauncher;
        assert_eq!(s.bid(&private(3, 1000), &public(0, 6)).unwrap(), Bid::new(12, true));
        assert_eq!(s.bid(&private(3, 10), &public(0, 6)).unwrap(), Bid::new(10, true));
    }

    #[test]
    fn ev_bot_win_chance_is_capped() {
        let ceiling = 10.0 + 8.0 + (1.5 * 7.0 * 2.0_f64).sqrt();
        assert!((EvBot::expected_value(50, 2, 10) - ceiling).abs() < 1e-9);
        assert!(EvBot::expected_value(1, 2, 10) < 1.0);
    }

    #[test]
    fn ev_bot_launches_only_with_enough_tech() {
        assert!(EvBot::expected_value(10, 2, 10) > EvBot::EV_THRESHOLD);
        assert!(EvBot::expected_value(2, 3, 10) < EvBot::EV_THRESHOLD);
    }
}
