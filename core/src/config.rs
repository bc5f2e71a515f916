use crate::{
    error::{GameError, GameResult},
    remote::{RemoteStrategy, StrategyAddress},
    strategy::{policy_by_name, Strategy},
    types::{Money, Tech},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, time::Duration};

/// Economic constants of one game. Fixed for the game's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_bankroll: Money,
    pub initial_tech: Tech,
    /// Price of the business-phase tech grant.
    pub base_price: Money,
    /// Exclusive upper bound of the business-phase tech draw.
    pub base_tech: Tech,
    /// Exclusive upper bound of the auction tech draw.
    pub auction_tech: Tech,
    pub failure_rate: f64,
    /// Per-round geometric decay of the failure weight.
    pub failure_rate_attenuation: f64,
    /// Charged to every mission participant.
    pub launch_cost: Money,
    /// Multiplier on the log-normal reward draws.
    pub reward_scale: f64,
    /// Auction sub-rounds allowed before a round is abandoned without a launch.
    pub max_auction_rounds: u64,
    /// Connect, ping and notification timeout for remote strategies.
    pub rpc_timeout_ms: u64,
    /// Read timeout for remote `bid` and `join_launch`. A human may be thinking.
    pub decision_timeout_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_bankroll:         1000,
            initial_tech:             0,
            base_price:               5,
            base_tech:                11,
            auction_tech:             11,
            failure_rate:             0.1,
            failure_rate_attenuation: 0.98,
            launch_cost:              5,
            reward_scale:             7.0,
            max_auction_rounds:       100,
            rpc_timeout_ms:           5000,
            decision_timeout_ms:      600_000,
        }
    }
}

impl GameConfig {
    /// Load overrides from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate_attenuation) {
            anyhow::bail!("failure_rate_attenuation must be in [0, 1], got {}", self.failure_rate_attenuation);
        }
        if self.failure_rate < 0.0 {
            anyhow::bail!("failure_rate must be non-negative, got {}", self.failure_rate);
        }
        if self.rpc_timeout_ms == 0 || self.decision_timeout_ms == 0 {
            anyhow::bail!("remote timeouts must be positive");
        }
        if self.max_auction_rounds == 0 {
            anyhow::bail!("max_auction_rounds must be at least 1");
        }
        Ok(())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }
}

/// One roster line: a unique name and where its decisions come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    /// A built-in policy name or `[identifier@]host:port`.
    pub strategy: String,
}

/// Ordered list of participants. Order is the fixed turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub players: Vec<RosterEntry>,
}

impl Default for Roster {
    fn default() -> Self {
        let entry = |name: &str, strategy: &str| RosterEntry { name: name.into(), strategy: strategy.into() };
        Self {
            players: vec![
                entry("SpongeBob", "sponge_bob"),
                entry("PassiveLauncher", "passive_launcher"),
                entry("AlwaysLauncher", "always_launch"),
                entry("AggressiveLauncher", "aggressive_launcher"),
            ],
        }
    }
}

/// How a roster entry's decisions are produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyDescriptor {
    Local(String),
    Remote(StrategyAddress),
}

impl StrategyDescriptor {
    pub fn parse(descriptor: &str) -> GameResult<Self> {
        let descriptor = descriptor.trim();
        if StrategyAddress::looks_like_address(descriptor) {
            Ok(Self::Remote(StrategyAddress::parse(descriptor)?))
        } else {
            Ok(Self::Local(descriptor.to_string()))
        }
    }
}

impl Roster {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let roster: Roster = serde_json::from_str(&content)?;
        Ok(roster)
    }

    /// Build every entry's strategy, in roster order.
    ///
    /// `local` is consulted before the built-in policies so callers can
    /// supply strategies the library does not ship (e.g. a terminal prompt).
    /// An unknown local name is an error here, before any round is played.
    pub fn resolve<F>(&self, config: &GameConfig, mut local: F) -> GameResult<Vec<(String, Box<dyn Strategy>)>>
    where
        F: FnMut(&str) -> Option<Box<dyn Strategy>>,
    {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.players.len());
        for entry in &self.players {
            if !seen.insert(entry.name.clone()) {
                return Err(GameError::DuplicatePlayer { name: entry.name.clone() });
            }
            let strategy: Box<dyn Strategy> = match StrategyDescriptor::parse(&entry.strategy)? {
                StrategyDescriptor::Remote(_) => {
                    Box::new(
                        RemoteStrategy::new(&entry.strategy, config.rpc_timeout())?
                            .with_decision_timeout(config.decision_timeout()),
                    )
                }
                StrategyDescriptor::Local(name) => local(&name)
                    .or_else(|| policy_by_name(&name))
                    .ok_or_else(|| GameError::UnimplementedStrategy {
                        player: entry.name.clone(),
                        reason: format!("no local policy named '{name}'"),
                    })?,
            };
            resolved.push((entry.name.clone(), strategy));
        }
        Ok(resolved)
    }
}
