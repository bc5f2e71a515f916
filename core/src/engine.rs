//! The game engine: owns the roster and drives every round.
//!
//! PHASE ORDER (fixed):
//!   1. Next round     (reset launch intent, ping strategies)
//!   2. Discovery      (new asteroid, publish base reward)
//!   3. Business       (every player buys a random tech grant at BASE_PRICE)
//!   4. Bankruptcy sweep
//!   5. Auction loop   (auction, sweep; repeat until somebody launches)
//!   6. Launch race    (everyone not yet launching may join)
//!   7. Mission        (weighted lottery against the failure entity)
//!
//! RULES:
//!   - Players are asked in roster order, one at a time.
//!   - PublicInformation changes only between player calls, never during.
//!   - Bankruptcy is checked only at sweep points, never mid-phase.
//!   - All randomness flows through the RngBank.
//!   - Every event is recorded in the event log.
//!   - One player's failure never aborts the game.

use crate::{
    asteroid::Asteroid,
    config::GameConfig,
    error::{GameError, GameResult},
    event::{EventLogEntry, GameEvent, PlayerLogEntry, PlayerLogKind, PlayerSnapshot},
    player::Player,
    public_info::PublicInformation,
    rng::{PhaseRng, PhaseSlot, RngBank},
    store::GameStore,
    strategy::Strategy,
    types::{Money, PlayerName, Round, RunId, Tech},
};
use serde::{Deserialize, Serialize};

/// Name the failure entity goes by in public information.
pub const FAILURE_ENTITY: &str = "Mission failure";

/// Final bookkeeping for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub name: PlayerName,
    pub bankroll: Money,
    pub tech: Tech,
    pub connected: bool,
}

impl From<&Player> for Standing {
    fn from(p: &Player) -> Self {
        Self {
            name: p.name.clone(),
            bankroll: p.bankroll,
            tech: p.tech,
            connected: p.is_connected(),
        }
    }
}

/// What `run` hands back. Survivors are unranked, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub run_id: RunId,
    pub rounds: Round,
    pub survivors: Vec<Standing>,
    pub losers: Vec<Standing>,
}

/// Result of one auction sub-round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionResult {
    pub winning_bid: Money,
    pub winners: Vec<PlayerName>,
    pub tech: Tech,
}

/// Result of a mission.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionResult {
    pub launchers: Vec<PlayerName>,
    pub total_tech: Tech,
    pub failure_weight: f64,
    pub winner: Option<PlayerName>,
    pub payoff: Money,
}

/// failure_rate * attenuation^round * total launcher tech
pub fn failure_weight(config: &GameConfig, round: Round, total_tech: Tech) -> f64 {
    let exponent = i32::try_from(round).unwrap_or(i32::MAX);
    config.failure_rate * config.failure_rate_attenuation.powi(exponent) * total_tech as f64
}

/// Draw the mission winner. Weights are the launchers' tech followed by
/// the failure weight. Returns the launcher index, or None when the
/// failure entity is drawn (or there is nothing to draw).
pub fn draw_mission_winner(rng: &mut PhaseRng, launcher_tech: &[Tech], failure_weight: f64) -> Option<usize> {
    let weights: Vec<f64> = launcher_tech
        .iter()
        .map(|t| *t as f64)
        .chain(std::iter::once(failure_weight))
        .collect();
    rng.pick_weighted(&weights).filter(|ix| *ix < launcher_tech.len())
}

pub struct GameEngine {
    pub run_id:  RunId,
    pub config:  GameConfig,
    pub round:   Round,
    rng_bank:    RngBank,
    players:     Vec<Player>,
    losers:      Vec<Player>,
    public:      PublicInformation,
    asteroid:    Option<Asteroid>,
    store:       GameStore,
    events:      Vec<GameEvent>,
    started:     bool,
    finished:    bool,
}

impl GameEngine {
    pub fn new(run_id: RunId, seed: u64, config: GameConfig, store: GameStore) -> Self {
        Self {
            run_id,
            config,
            round:    0,
            rng_bank: RngBank::new(seed),
            players:  Vec::new(),
            losers:   Vec::new(),
            public:   PublicInformation::new(),
            asteroid: None,
            store,
            events:   Vec::new(),
            started:  false,
            finished: false,
        }
    }

    /// Build an engine with the whole roster seated, in order.
    /// Fails on a duplicate name or a strategy that cannot decide.
    pub fn build(
        run_id: RunId,
        seed: u64,
        config: GameConfig,
        store: GameStore,
        roster: Vec<(String, Box<dyn Strategy>)>,
    ) -> GameResult<Self> {
        config.check()?;
        let mut engine = GameEngine::new(run_id, seed, config, store);
        for (name, strategy) in roster {
            engine.add_player(name, strategy)?;
        }
        Ok(engine)
    }

    /// In-memory store with the run registered. For tests and dry runs.
    pub fn build_test(
        run_id: &str,
        seed: u64,
        config: GameConfig,
        roster: Vec<(String, Box<dyn Strategy>)>,
    ) -> GameResult<Self> {
        let store = GameStore::in_memory()?;
        store.migrate()?;
        store.insert_run(run_id, seed, env!("CARGO_PKG_VERSION"))?;
        Self::build(run_id.to_string(), seed, config, store, roster)
    }

    /// Seat a player before the game starts.
    pub fn add_player(&mut self, name: impl Into<PlayerName>, strategy: Box<dyn Strategy>) -> GameResult<()> {
        let name = name.into();
        if self.players.iter().chain(self.losers.iter()).any(|p| p.name == name) {
            return Err(GameError::DuplicatePlayer { name });
        }
        let player = Player::new(name, strategy, self.config.initial_bankroll, self.config.initial_tech)?;
        log::info!("seated {} ({})", player.name, player.strategy_label());
        self.public.report_bankroll(&player.name, player.bankroll);
        self.players.push(player);
        Ok(())
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn losers(&self) -> &[Player] {
        &self.losers
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().chain(self.losers.iter()).find(|p| p.name == name)
    }

    pub fn public_information(&self) -> &PublicInformation {
        &self.public
    }

    pub fn asteroid(&self) -> Option<&Asteroid> {
        self.asteroid.as_ref()
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    /// Termination check: at most one player left, or the round cap hit.
    /// A cap of 0 means unbounded.
    pub fn is_over(&self, max_rounds: Round) -> bool {
        self.players.len() <= 1 || (max_rounds > 0 && self.round >= max_rounds)
    }

    // ── Run loop ───────────────────────────────────────────────

    /// Play until one player is left or `max_rounds` rounds have been
    /// played (0 = no cap). Survivors are returned unranked.
    pub fn run(&mut self, max_rounds: Round) -> GameResult<GameOutcome> {
        self.begin()?;
        while !self.is_over(max_rounds) {
            self.play_round()?;
        }
        self.finish()?;
        Ok(self.outcome())
    }

    pub fn outcome(&self) -> GameOutcome {
        GameOutcome {
            run_id:    self.run_id.clone(),
            rounds:    self.round,
            survivors: self.players.iter().map(Standing::from).collect(),
            losers:    self.losers.iter().map(Standing::from).collect(),
        }
    }

    /// Publish the starting state and call `begin` on every strategy. Runs once.
    pub fn begin(&mut self) -> GameResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.public.round = Some(self.round);
        self.report();
        for player in self.players.iter_mut() {
            player.begin(&self.public);
        }
        self.collect_disconnects()
    }

    /// Play one full round and return the events it produced.
    pub fn play_round(&mut self) -> GameResult<Vec<GameEvent>> {
        self.begin()?;
        self.next_round()?;
        self.discovery()?;
        self.business()?;
        self.remove_bankrupt_players()?;

        if self.players.len() > 1 {
            let mut auction_round = 0;
            let mut launched = false;
            while auction_round < self.config.max_auction_rounds {
                auction_round += 1;
                self.auction(auction_round)?;
                self.remove_bankrupt_players()?;
                if self.players.len() <= 1 {
                    break;
                }
                if self.is_launching() {
                    launched = true;
                    break;
                }
            }
            self.public.auction_round = None;

            if launched {
                self.launch_race()?;
                self.mission()?;
            } else if self.players.len() > 1 {
                self.broadcast(&format!(
                    "Nobody launched after {auction_round} auctions; the asteroid drifts away."
                ));
                self.emit(GameEvent::NoLaunch { round: self.round, auction_rounds: auction_round })?;
            }
        }

        self.collect_disconnects()?;
        self.report();
        Ok(std::mem::take(&mut self.events))
    }

    /// Call `end` on every survivor and loser. Runs once.
    pub fn finish(&mut self) -> GameResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.report();
        for player in self.players.iter_mut().chain(self.losers.iter_mut()) {
            player.end(&self.public);
        }
        self.collect_disconnects()?;
        let survivors = self.players.iter().map(|p| p.name.clone()).collect();
        self.emit(GameEvent::GameEnded { round: self.round, survivors })
    }

    // ── Phases ─────────────────────────────────────────────────

    pub fn next_round(&mut self) -> GameResult<()> {
        self.round += 1;
        self.public.round = Some(self.round);
        self.emit(GameEvent::RoundStarted { round: self.round, active_players: self.players.len() })?;
        for ix in 0..self.players.len() {
            self.players[ix].next_round();
            self.log_player(ix, PlayerLogKind::NextRound, false)?;
        }
        self.collect_disconnects()
    }

    pub fn discovery(&mut self) -> GameResult<()> {
        let asteroid = Asteroid::discover(
            self.rng_bank.for_phase(PhaseSlot::Asteroid),
            self.config.reward_scale,
        );
        self.asteroid = Some(asteroid);
        self.public.base_reward = Some(asteroid.base_reward);
        self.broadcast("-*-*-*-*-*-*-*-*-*-*-*-*-*-*-*-*-*-*");
        self.broadcast(&format!("New asteroid discovered! Base reward is {}.", asteroid.base_reward));
        self.emit(GameEvent::AsteroidDiscovered { round: self.round, base_reward: asteroid.base_reward })
    }

    pub fn business(&mut self) -> GameResult<()> {
        for ix in 0..self.players.len() {
            let bankroll_before = self.players[ix].bankroll;
            let name = self.players[ix].name.clone();
            self.broadcast(&format!("{name} has {bankroll_before} money."));

            let tech = self
                .rng_bank
                .for_phase(PhaseSlot::Business)
                .next_u64_below(self.config.base_tech);
            let price = self.config.base_price;
            self.players[ix].buy_tech(tech, price);
            self.log_player(ix, PlayerLogKind::Buy, false)?;
            self.emit(GameEvent::TechPurchased { round: self.round, player: name, tech, price, bankroll_before })?;
        }
        log::debug!("round={} business: {} players charged {}", self.round, self.players.len(), self.config.base_price);
        self.collect_disconnects()
    }

    /// Move bankrupt players to the losers list. Returns who was removed.
    pub fn remove_bankrupt_players(&mut self) -> GameResult<Vec<PlayerName>> {
        self.report();
        let bankrupt: Vec<(PlayerName, Money)> = self
            .players
            .iter()
            .filter(|p| p.is_bankrupt())
            .map(|p| (p.name.clone(), p.bankroll))
            .collect();
        if bankrupt.is_empty() {
            return Ok(Vec::new());
        }

        for (name, bankroll) in &bankrupt {
            self.broadcast(&format!("{name} is bankrupt in round {}.", self.round));
            self.emit(GameEvent::PlayerBankrupt { round: self.round, player: name.clone(), bankroll: *bankroll })?;
        }

        let (gone, active): (Vec<Player>, Vec<Player>) =
            std::mem::take(&mut self.players).into_iter().partition(|p| p.is_bankrupt());
        self.players = active;
        for player in gone {
            self.public.forget_player(&player.name);
            self.losers.push(player);
        }
        self.collect_disconnects()?;
        Ok(bankrupt.into_iter().map(|(n, _)| n).collect())
    }

    /// One sealed-bid, uniform-price auction. Every player whose bid equals
    /// the maximum wins the same tech draw at the same price.
    pub fn auction(&mut self, auction_round: u64) -> GameResult<AuctionResult> {
        self.report();
        self.public.auction_round = Some(auction_round);

        let mut bids = Vec::with_capacity(self.players.len());
        for ix in 0..self.players.len() {
            let amount = self.players[ix].bid(&self.public);
            bids.push(amount);
            self.log_player(ix, PlayerLogKind::Bid, true)?;
            let player = &self.players[ix];
            let event = GameEvent::BidSubmitted {
                round: self.round,
                auction_round,
                player: player.name.clone(),
                amount,
                launching: player.launching,
            };
            self.emit(event)?;
        }

        let Some(winning_bid) = bids.iter().copied().max() else {
            return Ok(AuctionResult { winning_bid: 0, winners: Vec::new(), tech: 0 });
        };

        let tech = self
            .rng_bank
            .for_phase(PhaseSlot::Auction)
            .next_u64_below(self.config.auction_tech);
        let mut winners = Vec::new();
        for ix in 0..self.players.len() {
            if self.players[ix].last_bid == winning_bid {
                self.players[ix].buy_tech(tech, winning_bid);
                self.log_player(ix, PlayerLogKind::Buy, false)?;
                winners.push(self.players[ix].name.clone());
            }
        }

        self.public.last_winning_bid = winning_bid;
        self.public.last_winning_bidders = winners.clone();
        log::debug!(
            "round={} auction={auction_round}: winning bid {winning_bid} by {winners:?} for {tech} tech",
            self.round
        );
        self.emit(GameEvent::AuctionSettled {
            round: self.round,
            auction_round,
            winning_bid,
            winners: winners.clone(),
            tech,
        })?;
        self.collect_disconnects()?;
        Ok(AuctionResult { winning_bid, winners, tech })
    }

    pub fn is_launching(&self) -> bool {
        self.players.iter().any(|p| p.launching)
    }

    /// Somebody committed to launching; everybody else may join.
    pub fn launch_race(&mut self) -> GameResult<()> {
        self.report();
        for ix in 0..self.players.len() {
            let launching = self.players[ix].launch(&self.public);
            self.log_player(ix, PlayerLogKind::Launch, true)?;
            let name = self.players[ix].name.clone();
            self.emit(GameEvent::LaunchDecided { round: self.round, player: name, launching })?;
        }
        self.collect_disconnects()
    }

    /// Resolve the mission among launching players.
    pub fn mission(&mut self) -> GameResult<MissionResult> {
        let launcher_ix: Vec<usize> = (0..self.players.len())
            .filter(|ix| self.players[*ix].launching)
            .collect();

        let mut launchers = Vec::with_capacity(launcher_ix.len());
        let mut launcher_tech = Vec::with_capacity(launcher_ix.len());
        for ix in &launcher_ix {
            let name = self.players[*ix].name.clone();
            self.broadcast(&format!("{name} is launching."));
            let player = &mut self.players[*ix];
            player.pay(self.config.launch_cost);
            launcher_tech.push(player.tech);
            launchers.push(name);
        }

        let total_tech: Tech = launcher_tech.iter().sum();
        let failure_weight = failure_weight(&self.config, self.round, total_tech);
        let drawn = draw_mission_winner(
            self.rng_bank.for_phase(PhaseSlot::Mission),
            &launcher_tech,
            failure_weight,
        );

        let asteroid = self
            .asteroid
            .unwrap_or_else(|| Asteroid::with_base_reward(0, self.config.reward_scale));
        let payoff = match drawn {
            Some(_) => asteroid.payoff(total_tech, self.rng_bank.for_phase(PhaseSlot::Mission)),
            None => 0,
        };

        for (pos, ix) in launcher_ix.iter().enumerate() {
            let won = drawn == Some(pos);
            self.players[*ix].collect_payoff(if won { payoff } else { 0 });
            self.log_player(*ix, PlayerLogKind::Payoff, false)?;
        }

        let winner = drawn.map(|pos| launchers[pos].clone());
        self.public.last_winning_miner = Some(winner.clone().unwrap_or_else(|| FAILURE_ENTITY.to_string()));
        self.public.last_mining_payoff = Some(payoff);
        match &winner {
            Some(name) => self.broadcast(&format!("{name} mines the asteroid for {payoff} money!")),
            None => self.broadcast(&format!("{FAILURE_ENTITY}: nobody mines the asteroid.")),
        }

        let result = MissionResult { launchers, total_tech, failure_weight, winner, payoff };
        self.emit(GameEvent::MissionResolved {
            round: self.round,
            launchers: result.launchers.clone(),
            total_tech,
            failure_weight,
            winner: result.winner.clone(),
            payoff,
        })?;
        self.collect_disconnects()?;
        Ok(result)
    }

    // ── Plumbing ───────────────────────────────────────────────

    /// Refresh every active player's bankroll in the public information.
    pub fn report(&mut self) {
        for player in &self.players {
            self.public.report_bankroll(&player.name, player.bankroll);
        }
    }

    /// Send a human-readable line to every active player.
    pub fn broadcast(&mut self, message: &str) {
        log::info!("{message}");
        for player in self.players.iter_mut() {
            player.broadcast(message);
        }
    }

    fn collect_disconnects(&mut self) -> GameResult<()> {
        let dropped: Vec<(PlayerName, String)> = self
            .players
            .iter_mut()
            .chain(self.losers.iter_mut())
            .filter_map(|p| p.take_disconnect().map(|reason| (p.name.clone(), reason)))
            .collect();
        for (player, reason) in dropped {
            self.broadcast(&format!("Could not connect to player {player}, removing."));
            self.emit(GameEvent::PlayerDisconnected { round: self.round, player, reason })?;
        }
        Ok(())
    }

    fn emit(&mut self, event: GameEvent) -> GameResult<()> {
        let entry = EventLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            round:      self.round,
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(&event)?,
        };
        self.store.append_event(&entry)?;
        self.events.push(event);
        Ok(())
    }

    fn log_player(&self, ix: usize, kind: PlayerLogKind, with_public: bool) -> GameResult<()> {
        let player = &self.players[ix];
        let snapshot = PlayerSnapshot {
            private: player.private_information(),
            public:  with_public.then(|| self.public.clone()),
        };
        let entry = PlayerLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            round:      self.round,
            player:     player.name.clone(),
            event_type: kind.as_str().to_string(),
            payload:    serde_json::to_string(&snapshot)?,
        };
        self.store.append_player_log(&entry)
    }

    /// Query events for a specific round from the store.
    pub fn store_events_for_round(&self, round: Round) -> GameResult<Vec<EventLogEntry>> {
        self.store.events_for_round(&self.run_id, round)
    }

    pub fn store_player_log(&self, player: &str) -> GameResult<Vec<PlayerLogEntry>> {
        self.store.player_log(&self.run_id, player)
    }
}
