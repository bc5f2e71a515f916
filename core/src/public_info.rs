//! Public information broadcast to every strategy each phase.
//!
//! RULE: Only the engine mutates PublicInformation, and only between
//! phases. Strategies receive a shared reference and never write to it.
//! Every field is always present in the serialized form (null when
//! unknown) so remote strategies can rely on its shape.

use crate::types::{Money, PlayerName, Round};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What everybody knows about one active player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub bankroll: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicInformation {
    pub round: Option<Round>,
    /// Active roster with bankrolls as of the last report.
    pub players: BTreeMap<PlayerName, PlayerSummary>,
    pub last_winning_bid: Money,
    pub last_winning_bidders: Vec<PlayerName>,
    /// Auction sub-round within the current round; None outside auctions.
    pub auction_round: Option<u64>,
    pub last_winning_miner: Option<PlayerName>,
    pub last_mining_payoff: Option<Money>,
    pub base_reward: Option<Money>,
}

impl PublicInformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_players(&self) -> usize {
        self.players.len()
    }

    pub(crate) fn report_bankroll(&mut self, name: &str, bankroll: Money) {
        self.players
            .entry(name.to_string())
            .or_default()
            .bankroll = bankroll;
    }

    pub(crate) fn forget_player(&mut self, name: &str) {
        self.players.remove(name);
    }

    pub fn to_json(&self) -> serde_json::Value {
        // A struct of plain fields always serializes.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_present_at_start() {
        let json = PublicInformation::new().to_json();
        let obj = json.as_object().unwrap();
        for key in [
            "round",
            "players",
            "last_winning_bid",
            "last_winning_bidders",
            "auction_round",
            "last_winning_miner",
            "last_mining_payoff",
            "base_reward",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert!(obj["last_winning_miner"].is_null());
    }

    #[test]
    fn report_overwrites_bankroll() {
        let mut info = PublicInformation::new();
        info.report_bankroll("ati", 1000);
        info.report_bankroll("ati", 995);
        assert_eq!(info.players["ati"].bankroll, 995);
        info.forget_player("ati");
        assert_eq!(info.active_players(), 0);
    }
}
