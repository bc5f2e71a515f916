//! Events emitted by the engine, and the records persisted for them.
//!
//! Variants are append-only; stored payloads must stay decodable.

use crate::{
    public_info::PublicInformation,
    strategy::PrivateInformation,
    types::{Money, PlayerName, Round, RunId, Tech},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Round structure ────────────────────────────
    RoundStarted {
        round: Round,
        active_players: usize,
    },
    AsteroidDiscovered {
        round: Round,
        base_reward: Money,
    },

    // ── Economy ────────────────────────────────────
    TechPurchased {
        round: Round,
        player: PlayerName,
        tech: Tech,
        price: Money,
        bankroll_before: Money,
    },
    BidSubmitted {
        round: Round,
        auction_round: u64,
        player: PlayerName,
        amount: Money,
        launching: bool,
    },
    AuctionSettled {
        round: Round,
        auction_round: u64,
        winning_bid: Money,
        winners: Vec<PlayerName>,
        tech: Tech,
    },
    PlayerBankrupt {
        round: Round,
        player: PlayerName,
        bankroll: Money,
    },
    PlayerDisconnected {
        round: Round,
        player: PlayerName,
        reason: String,
    },

    // ── Mission ────────────────────────────────────
    LaunchDecided {
        round: Round,
        player: PlayerName,
        launching: bool,
    },
    MissionResolved {
        round: Round,
        launchers: Vec<PlayerName>,
        total_tech: Tech,
        failure_weight: f64,
        /// None when the mission failed.
        winner: Option<PlayerName>,
        payoff: Money,
    },
    NoLaunch {
        round: Round,
        auction_rounds: u64,
    },

    GameEnded {
        round: Round,
        survivors: Vec<PlayerName>,
    },
}

impl GameEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RoundStarted { .. }       => "round_started",
            Self::AsteroidDiscovered { .. } => "asteroid_discovered",
            Self::TechPurchased { .. }      => "tech_purchased",
            Self::BidSubmitted { .. }       => "bid_submitted",
            Self::AuctionSettled { .. }     => "auction_settled",
            Self::PlayerBankrupt { .. }     => "player_bankrupt",
            Self::PlayerDisconnected { .. } => "player_disconnected",
            Self::LaunchDecided { .. }      => "launch_decided",
            Self::MissionResolved { .. }    => "mission_resolved",
            Self::NoLaunch { .. }           => "no_launch",
            Self::GameEnded { .. }          => "game_ended",
        }
    }
}

/// Per-player statistics rows. One per engine-visible event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerLogKind {
    Buy,
    Bid,
    Launch,
    Payoff,
    NextRound,
}

impl PlayerLogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy       => "buy",
            Self::Bid       => "bid",
            Self::Launch    => "launch",
            Self::Payoff    => "payoff",
            Self::NextRound => "nextround",
        }
    }
}

/// The JSON object written for each player event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub private: PrivateInformation,
    /// Absent for bookkeeping-only events (buy, payoff, nextround).
    pub public: Option<PublicInformation>,
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub round: Round,
    pub event_type: String,
    pub payload: String, // JSON-serialized GameEvent
}

/// A player log row as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub round: Round,
    pub player: PlayerName,
    pub event_type: String,
    pub payload: String, // JSON-serialized PlayerSnapshot
}
