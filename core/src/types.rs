//! Shared primitive types used across the entire game.

/// A game round. Round 0 is the pre-game state; play starts at round 1.
pub type Round = u64;

/// Player names are unique within one game.
pub type PlayerName = String;

/// The canonical run identifier.
pub type RunId = String;

/// Currency. Negative balances mean bankruptcy.
pub type Money = i64;

/// Technology units.
pub type Tech = u64;
