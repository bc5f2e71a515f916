//! The strategy seam.
//!
//! RULE: A strategy never owns economic truth. The player hands it a fresh
//! PrivateInformation snapshot on every call and validates whatever comes
//! back. The engine and the player never branch on where a strategy runs;
//! remote endpoints implement this same trait (see `remote::RemoteStrategy`).

use crate::{
    error::StrategyResult,
    public_info::PublicInformation,
    types::{Money, PlayerName, Tech},
};
use serde::{Deserialize, Serialize};

pub mod policies;

pub use policies::{
    policy_by_name, AggressiveLauncher, AlwaysLaunch, EvBot, Observer, PassiveLauncher,
    SpongeBob, POLICY_NAMES,
};

/// The player's own bookkeeping, copied out for each decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateInformation {
    pub name: PlayerName,
    pub tech: Tech,
    pub bankroll: Money,
    pub launching: bool,
    pub last_bid: Money,
}

/// An auction decision: how much to pay for tech, and whether to launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub amount: Money,
    pub launching: bool,
}

impl Bid {
    pub fn new(amount: Money, launching: bool) -> Self {
        Self { amount, launching }
    }

    /// The "no bid, no launch" decision.
    pub fn pass() -> Self {
        Self::default()
    }
}

/// The contract every decision source must fulfil.
///
/// `bid` and `join_launch` are required. The lifecycle hooks, `broadcast`
/// and `ping` default to no-ops.
pub trait Strategy: Send {
    /// Short label used in logs.
    fn label(&self) -> String {
        "local".to_string()
    }

    /// Construction-time check. A strategy that cannot make decisions must
    /// fail here rather than mid-round.
    fn validate(&mut self) -> StrategyResult<()> {
        Ok(())
    }

    fn bid(
        &mut self,
        private: &PrivateInformation,
        public: &PublicInformation,
    ) -> StrategyResult<Bid>;

    /// Asked only of players not already launching.
    fn join_launch(
        &mut self,
        private: &PrivateInformation,
        public: &PublicInformation,
    ) -> StrategyResult<bool>;

    fn begin(
        &mut self,
        _private: &PrivateInformation,
        _public: &PublicInformation,
    ) -> StrategyResult<()> {
        Ok(())
    }

    fn end(
        &mut self,
        _private: &PrivateInformation,
        _public: &PublicInformation,
    ) -> StrategyResult<()> {
        Ok(())
    }

    /// Human-readable game progress. Bots usually ignore it.
    fn broadcast(&mut self, _message: &str) -> StrategyResult<()> {
        Ok(())
    }

    fn ping(&mut self) -> StrategyResult<bool> {
        Ok(true)
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn label(&self) -> String {
        (**self).label()
    }

    fn validate(&mut self) -> StrategyResult<()> {
        (**self).validate()
    }

    fn bid(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Bid> {
        (**self).bid(private, public)
    }

    fn join_launch(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<bool> {
        (**self).join_launch(private, public)
    }

    fn begin(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<()> {
        (**self).begin(private, public)
    }

    fn end(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<()> {
        (**self).end(private, public)
    }

    fn broadcast(&mut self, message: &str) -> StrategyResult<()> {
        (**self).broadcast(message)
    }

    fn ping(&mut self) -> StrategyResult<bool> {
        (**self).ping()
    }
}

/// Coerce a loosely-typed bid amount into currency.
/// Integers pass through, floats truncate, numeric strings parse,
/// anything else becomes 0.
pub fn coerce_amount(value: &serde_json::Value) -> Money {
    use serde_json::Value;
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as Money))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<Money>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as Money))
                .unwrap_or(0)
        }
        Value::Bool(b) => Money::from(*b),
        _ => 0,
    }
}

/// Truthiness of a loosely-typed launch flag.
pub fn coerce_flag(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amounts_coerce_like_integers() {
        assert_eq!(coerce_amount(&json!(12)), 12);
        assert_eq!(coerce_amount(&json!(-3)), -3);
        assert_eq!(coerce_amount(&json!(7.9)), 7);
        assert_eq!(coerce_amount(&json!("15")), 15);
        assert_eq!(coerce_amount(&json!(" 4 ")), 4);
        assert_eq!(coerce_amount(&json!("lots")), 0);
        assert_eq!(coerce_amount(&json!(null)), 0);
        assert_eq!(coerce_amount(&json!([1, 2])), 0);
        assert_eq!(coerce_amount(&json!(true)), 1);
    }

    #[test]
    fn flags_follow_truthiness() {
        assert!(coerce_flag(&json!(true)));
        assert!(coerce_flag(&json!(1)));
        assert!(!coerce_flag(&json!(0)));
        assert!(!coerce_flag(&json!("")));
        assert!(!coerce_flag(&json!(null)));
    }
}
