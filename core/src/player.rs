//! Player bookkeeping and fault isolation around a strategy.
//!
//! RULE: The engine changes a player only through these methods.
//! Whatever the strategy does, a decision method always returns a usable
//! value:
//!   - application faults are logged and count as "no action" for that call;
//!   - transport failures disable the strategy for good, after which bids
//!     are (0, false) and launch questions are answered "no" locally;
//!   - a zero-tech player can never commit to a launch from the auction.

use crate::{
    error::{GameError, GameResult, StrategyError, StrategyResult},
    public_info::PublicInformation,
    strategy::{Bid, PrivateInformation, Strategy},
    types::{Money, PlayerName, Tech},
};
use std::fmt;

pub struct Player {
    pub name: PlayerName,
    pub bankroll: Money,
    pub tech: Tech,
    pub launching: bool,
    pub last_bid: Money,
    strategy: Box<dyn Strategy>,
    connected: bool,
    pending_disconnect: Option<String>,
}

impl Player {
    /// Wrap a strategy. A strategy missing a required capability is
    /// rejected here; an unreachable remote one yields a disabled player.
    pub fn new(
        name: impl Into<PlayerName>,
        mut strategy: Box<dyn Strategy>,
        bankroll: Money,
        tech: Tech,
    ) -> GameResult<Self> {
        let name = name.into();
        let mut player = Self {
            name: name.clone(),
            bankroll,
            tech,
            launching: false,
            last_bid: 0,
            strategy: Box::new(Disabled),
            connected: true,
            pending_disconnect: None,
        };
        match strategy.validate() {
            Ok(()) => {}
            Err(StrategyError::Unimplemented(capability)) => {
                return Err(GameError::UnimplementedStrategy {
                    player: name,
                    reason: format!("missing '{capability}'"),
                });
            }
            Err(StrategyError::Fault { code, message }) => {
                log::warn!("player {name}: fault {code} during validation: {message}");
            }
            Err(StrategyError::Transport(reason)) => {
                player.strategy = strategy;
                player.disable(reason);
                return Ok(player);
            }
        }
        player.strategy = strategy;
        Ok(player)
    }

    pub fn private_information(&self) -> PrivateInformation {
        PrivateInformation {
            name: self.name.clone(),
            tech: self.tech,
            bankroll: self.bankroll,
            launching: self.launching,
            last_bid: self.last_bid,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn strategy_label(&self) -> String {
        self.strategy.label()
    }

    pub fn is_bankrupt(&self) -> bool {
        self.bankroll < 0
    }

    /// The reason this player was disconnected since the last call, once.
    pub fn take_disconnect(&mut self) -> Option<String> {
        self.pending_disconnect.take()
    }

    // ── Decisions ──────────────────────────────────────────────

    /// Ask for a bid. Records it as `last_bid` and sets the launch intent.
    pub fn bid(&mut self, public: &PublicInformation) -> Money {
        let decision = if self.connected {
            let private = self.private_information();
            match self.strategy.bid(&private, public) {
                Ok(bid) => bid,
                Err(e) => {
                    self.on_strategy_error("bid", e);
                    Bid::pass()
                }
            }
        } else {
            Bid::pass()
        };

        // Negative bids would pay the bidder for tech.
        self.last_bid = decision.amount.max(0);
        self.launching = decision.launching && self.tech > 0;
        self.last_bid
    }

    /// Offer to join a launch. Players already launching are not asked.
    pub fn launch(&mut self, public: &PublicInformation) -> bool {
        if self.launching {
            return true;
        }
        if !self.connected {
            return false;
        }
        let private = self.private_information();
        self.launching = match self.strategy.join_launch(&private, public) {
            Ok(join) => join,
            Err(e) => {
                self.on_strategy_error("join_launch", e);
                false
            }
        };
        self.launching
    }

    // ── Lifecycle, best effort ─────────────────────────────────

    pub fn begin(&mut self, public: &PublicInformation) {
        if !self.connected {
            return;
        }
        let private = self.private_information();
        if let Err(e) = self.strategy.begin(&private, public) {
            self.on_strategy_error("begin", e);
        }
    }

    pub fn end(&mut self, public: &PublicInformation) {
        if !self.connected {
            return;
        }
        let private = self.private_information();
        if let Err(e) = self.strategy.end(&private, public) {
            self.on_strategy_error("end", e);
        }
    }

    pub fn broadcast(&mut self, message: &str) {
        if !self.connected {
            return;
        }
        if let Err(e) = self.strategy.broadcast(message) {
            self.on_strategy_error("broadcast", e);
        }
    }

    /// Start-of-round housekeeping: clear launch intent, check liveness.
    pub fn next_round(&mut self) {
        self.launching = false;
        if !self.connected {
            return;
        }
        match self.strategy.ping() {
            Ok(true) => {}
            Ok(false) => self.disable("did not answer ping".into()),
            Err(e) => self.on_strategy_error("ping", e),
        }
    }

    // ── Bookkeeping ────────────────────────────────────────────

    pub fn buy_tech(&mut self, tech: Tech, price: Money) {
        self.tech += tech;
        self.bankroll -= price;
    }

    pub fn pay(&mut self, amount: Money) {
        self.bankroll -= amount;
    }

    /// Settle a mission: tech is spent whether or not this player won.
    pub fn collect_payoff(&mut self, payoff: Money) {
        self.tech = 0;
        self.bankroll += payoff;
    }

    // ── Fault isolation ────────────────────────────────────────

    fn on_strategy_error(&mut self, call: &str, error: StrategyError) {
        match error {
            StrategyError::Fault { code, message } => {
                log::warn!(
                    "player {} ({}): fault on {call}: code {code}: {message}",
                    self.name,
                    self.strategy.label()
                );
            }
            StrategyError::Transport(reason) => self.disable(format!("{call}: {reason}")),
            StrategyError::Unimplemented(capability) => {
                log::error!("player {}: strategy does not implement '{capability}'", self.name);
                self.disable(format!("missing '{capability}'"));
            }
        }
    }

    fn disable(&mut self, reason: String) {
        if !self.connected {
            return;
        }
        log::warn!(
            "Could not reach player {} ({}), removing: {reason}",
            self.name,
            self.strategy.label()
        );
        self.connected = false;
        self.launching = false;
        self.strategy = Box::new(Disabled);
        self.pending_disconnect = Some(reason);
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("bankroll", &self.bankroll)
            .field("tech", &self.tech)
            .field("launching", &self.launching)
            .field("last_bid", &self.last_bid)
            .field("connected", &self.connected)
            .finish()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " - - - - - - - - - - -")?;
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "tech: {}", self.tech)?;
        writeln!(f, "bankroll: {}", self.bankroll)?;
        writeln!(f, "last_bid: {}", self.last_bid)?;
        writeln!(f, "launching: {}", self.launching)?;
        write!(f, " - - - - - - - - - - -")
    }
}

/// Stands in for a strategy that has been cut off. Never contacted.
struct Disabled;

impl Strategy for Disabled {
    fn label(&self) -> String {
        "disconnected".into()
    }

    fn bid(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<Bid> {
        Ok(Bid::pass())
    }

    fn join_launch(&mut self, _private: &PrivateInformation, _public: &PublicInformation) -> StrategyResult<bool> {
        Ok(false)
    }

    fn ping(&mut self) -> StrategyResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    /// Replays fixed answers and counts calls.
    struct Canned {
        bid: StrategyResult<Bid>,
        join: StrategyResult<bool>,
        calls: Arc<AtomicUsize>,
    }

    impl Canned {
        fn new(bid: StrategyResult<Bid>, join: StrategyResult<bool>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { bid, join, calls: calls.clone() }, calls)
        }
    }

    impl Strategy for Canned {
        fn bid(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<Bid> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bid.clone()
        }

        fn join_launch(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.join.clone()
        }
    }

    struct Incomplete;

    impl Strategy for Incomplete {
        fn validate(&mut self) -> StrategyResult<()> {
            Err(StrategyError::Unimplemented("bid"))
        }

        fn bid(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<Bid> {
            Err(StrategyError::Unimplemented("bid"))
        }

        fn join_launch(&mut self, _p: &PrivateInformation, _q: &PublicInformation) -> StrategyResult<bool> {
            Err(StrategyError::Unimplemented("join_launch"))
        }
    }

    fn player(bid: StrategyResult<Bid>, join: StrategyResult<bool>, tech: Tech) -> (Player, Arc<AtomicUsize>) {
        let (s, calls) = Canned::new(bid, join);
        (Player::new("p", Box::new(s), 100, tech).unwrap(), calls)
    }

    #[test]
    fn zero_tech_cannot_commit_to_launch() {
        let (mut p, _) = player(Ok(Bid::new(5, true)), Ok(true), 0);
        assert_eq!(p.bid(&PublicInformation::new()), 5);
        assert!(!p.launching);

        let (mut p, _) = player(Ok(Bid::new(5, true)), Ok(true), 1);
        p.bid(&PublicInformation::new());
        assert!(p.launching);
    }

    #[test]
    fn negative_bids_clamp_to_zero() {
        let (mut p, _) = player(Ok(Bid::new(-4, false)), Ok(false), 3);
        assert_eq!(p.bid(&PublicInformation::new()), 0);
        assert_eq!(p.last_bid, 0);
    }

    #[test]
    fn fault_is_a_null_decision_but_keeps_player_connected() {
        let fault = StrategyError::Fault { code: 3, message: "nope".into() };
        let (mut p, calls) = player(Err(fault.clone()), Err(fault), 5);
        assert_eq!(p.bid(&PublicInformation::new()), 0);
        assert!(!p.launching);
        assert!(!p.launch(&PublicInformation::new()));
        assert!(p.is_connected());
        p.bid(&PublicInformation::new());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(p.take_disconnect().is_none());
    }

    #[test]
    fn transport_failure_disables_for_good() {
        let down = StrategyError::Transport("connection refused".into());
        let (mut p, calls) = player(Err(down.clone()), Err(down), 5);
        assert_eq!(p.strategy_label(), "local");
        p.bid(&PublicInformation::new());
        assert!(!p.is_connected());
        assert_eq!(p.strategy_label(), "disconnected");
        assert!(p.take_disconnect().is_some());
        assert!(p.take_disconnect().is_none());

        for _ in 0..5 {
            assert_eq!(p.bid(&PublicInformation::new()), 0);
            assert!(!p.launching);
            assert!(!p.launch(&PublicInformation::new()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no calls after disconnect");
    }

    #[test]
    fn committed_launcher_is_not_asked_again() {
        let (mut p, calls) = player(Ok(Bid::new(1, true)), Ok(false), 2);
        p.bid(&PublicInformation::new());
        assert!(p.launch(&PublicInformation::new()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn next_round_clears_intent() {
        let (mut p, _) = player(Ok(Bid::new(1, true)), Ok(false), 2);
        p.bid(&PublicInformation::new());
        p.next_round();
        assert!(!p.launching);
        assert!(p.is_connected());
    }

    #[test]
    fn payoff_consumes_tech() {
        let (mut p, _) = player(Ok(Bid::pass()), Ok(false), 0);
        p.buy_tech(7, 5);
        assert_eq!((p.tech, p.bankroll), (7, 95));
        p.collect_payoff(30);
        assert_eq!((p.tech, p.bankroll), (0, 125));
        p.collect_payoff(0);
        assert_eq!(p.bankroll, 125);
    }

    #[test]
    fn missing_capability_fails_construction() {
        let err = Player::new("x", Box::new(Incomplete), 100, 0).err().unwrap();
        assert!(matches!(err, GameError::UnimplementedStrategy { .. }));
    }
}
