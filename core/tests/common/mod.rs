//! Shared test strategies and helpers.
#![allow(dead_code)]

use smp_core::{
    engine::GameEngine,
    error::{StrategyError, StrategyResult},
    event::GameEvent,
    public_info::PublicInformation,
    strategy::{Bid, PrivateInformation, Strategy},
};
use std::sync::{Arc, Mutex};

/// Always answers the same way.
pub struct Scripted {
    pub amount: i64,
    pub launching: bool,
    pub join: bool,
}

impl Scripted {
    pub fn new(amount: i64, launching: bool, join: bool) -> Self {
        Self { amount, launching, join }
    }
}

impl Strategy for Scripted {
    fn bid(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<Bid> {
        Ok(Bid::new(self.amount, self.launching))
    }

    fn join_launch(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<bool> {
        Ok(self.join)
    }
}

/// Records every call it receives by method name.
pub struct Recording {
    pub inner: Scripted,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl Recording {
    pub fn new(inner: Scripted) -> (Self, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (Self { inner, calls: calls.clone() }, calls)
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl Strategy for Recording {
    fn bid(&mut self, p: &PrivateInformation, q: &PublicInformation) -> StrategyResult<Bid> {
        self.record("bid");
        self.inner.bid(p, q)
    }

    fn join_launch(&mut self, p: &PrivateInformation, q: &PublicInformation) -> StrategyResult<bool> {
        self.record("join_launch");
        self.inner.join_launch(p, q)
    }

    fn begin(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<()> {
        self.record("begin");
        Ok(())
    }

    fn end(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<()> {
        self.record("end");
        Ok(())
    }

    fn broadcast(&mut self, _message: &str) -> StrategyResult<()> {
        self.record("broadcast");
        Ok(())
    }
}

/// Notes the auction sub-round it was shown on every decision.
/// Commits to launching once it sees `launch_at`.
pub struct AuctionWatcher {
    pub launch_at: Option<u64>,
    pub seen: Arc<Mutex<Vec<(&'static str, Option<u64>)>>>,
}

impl AuctionWatcher {
    pub fn new(launch_at: Option<u64>) -> (Self, Arc<Mutex<Vec<(&'static str, Option<u64>)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (Self { launch_at, seen: seen.clone() }, seen)
    }
}

impl Strategy for AuctionWatcher {
    fn bid(&mut self, _p: &PrivateInformation, q: &PublicInformation) -> StrategyResult<Bid> {
        self.seen.lock().unwrap().push(("bid", q.auction_round));
        let launching = self.launch_at.is_some() && q.auction_round == self.launch_at;
        Ok(Bid::new(1, launching))
    }

    fn join_launch(&mut self, _p: &PrivateInformation, q: &PublicInformation) -> StrategyResult<bool> {
        self.seen.lock().unwrap().push(("join_launch", q.auction_round));
        Ok(false)
    }
}

/// Faults on every decision with the given code.
pub struct Faulty(pub i64);

impl Strategy for Faulty {
    fn bid(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<Bid> {
        Err(StrategyError::Fault { code: self.0, message: "bid refused".into() })
    }

    fn join_launch(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<bool> {
        Err(StrategyError::Fault { code: self.0, message: "launch refused".into() })
    }
}

pub fn roster(entries: Vec<(&str, Box<dyn Strategy>)>) -> Vec<(String, Box<dyn Strategy>)> {
    entries.into_iter().map(|(n, s)| (n.to_string(), s)).collect()
}

/// Every event the engine persisted, decoded, in order.
pub fn all_events(engine: &GameEngine) -> Vec<GameEvent> {
    (0..=engine.round)
        .flat_map(|round| {
            engine
                .store_events_for_round(round)
                .expect("read events")
                .into_iter()
                .map(|e| serde_json::from_str::<GameEvent>(&e.payload).expect("decode event"))
        })
        .collect()
}

pub fn count(calls: &Arc<Mutex<Vec<String>>>, name: &str) -> usize {
    calls.lock().unwrap().iter().filter(|c| *c == name).count()
}
