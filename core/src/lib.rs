//! Space mining poker.
//!
//! A repeated multi-player game about exploiting a shared resource: players
//! buy technology, bid for more in uniform-price auctions, decide whether to
//! commit to a risky mining mission, and a single winner is drawn with
//! probability proportional to invested technology.
//!
//! Decisions come from [`strategy::Strategy`] implementations, either local
//! policies or remote endpoints reached over the line-delimited JSON
//! protocol in [`remote`].

pub mod asteroid;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod player;
pub mod public_info;
pub mod remote;
pub mod rng;
pub mod store;
pub mod strategy;
pub mod types;
