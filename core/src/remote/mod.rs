//! Remote strategies over line-delimited JSON on TCP.
//!
//! One request line, one response line:
//!
//!   -> {"id": 3, "method": "bid", "params": {"private": {..}, "public": {..}}}
//!   <- {"id": 3, "result": [12, true]}
//!   <- {"id": 3, "fault": {"code": 3, "message": "..."}}
//!
//! Methods: bid, join_launch, begin, end, broadcast, ping.
//! `client` is the game side, `server` hosts a local strategy for a game
//! running elsewhere.

pub mod address;
pub mod client;
pub mod protocol;
pub mod server;

pub use address::StrategyAddress;
pub use client::RemoteStrategy;
pub use protocol::{Fault, Request, Response};
pub use server::StrategyServer;
