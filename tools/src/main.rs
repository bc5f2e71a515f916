//! smp: headless runner for space mining poker.
//!
//! Usage:
//!   smp --seed 12345 --rounds 200 --db run.db
//!   smp --roster roster.json --config game.json --json
//!   smp --db run.db --replay smp-12345-<uuid>     # same seed as a stored run

use anyhow::{bail, Result};
use smp_core::{
    config::{GameConfig, Roster},
    engine::{GameEngine, GameOutcome, Standing},
    store::GameStore,
    strategy::{Strategy, POLICY_NAMES},
};
use smp_runner::terminal::Terminal;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let rounds = parse_arg(&args, "--rounds", 200u64);
    let json_output = args.iter().any(|a| a == "--json");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");

    let mut config = match flag_value(&args, "--config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    config.rpc_timeout_ms = parse_arg(&args, "--rpc-timeout", config.rpc_timeout_ms);
    config.decision_timeout_ms = parse_arg(&args, "--decision-timeout", config.decision_timeout_ms);
    let roster = match flag_value(&args, "--roster") {
        Some(path) => Roster::load(path)?,
        None => Roster::default(),
    };

    let store = GameStore::open(db)?;
    store.migrate()?;
    let seed = resolve_seed(&args, &store)?;
    let run_id = flag_value(&args, "--run-id")
        .map(str::to_string)
        .unwrap_or_else(|| format!("smp-{seed}-{}", uuid::Uuid::new_v4().simple()));
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    if !json_output {
        println!("Space Mining Poker");
        println!("  seed:      {seed}");
        println!("  rounds:    {}", if rounds == 0 { "unbounded".to_string() } else { rounds.to_string() });
        println!("  db:        {db}");
        println!("  players:   {}", roster.players.len());
        println!();
    }

    let strategies = roster.resolve(&config, local_strategy)?;
    let mut engine = GameEngine::build(run_id, seed, config, store, strategies)?;
    let outcome = engine.run(rounds)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&mut engine, &outcome)?;
    }
    Ok(())
}

/// `--replay` reuses a stored run's seed; otherwise `--seed` (default 42).
fn resolve_seed(args: &[String], store: &GameStore) -> Result<u64> {
    match flag_value(args, "--replay") {
        Some(previous) => match store.run_seed(previous)? {
            Some(seed) => Ok(seed),
            None => bail!("no stored run '{previous}'"),
        },
        None => Ok(parse_arg(args, "--seed", 42u64)),
    }
}

/// Strategies only the runner can build.
fn local_strategy(name: &str) -> Option<Box<dyn Strategy>> {
    match name {
        "terminal" | "Terminal" | "human" => Some(Box::new(Terminal)),
        _ => None,
    }
}

/// Highest bankroll wins; earlier roster position breaks ties.
fn top_player(survivors: &[Standing]) -> Option<&Standing> {
    survivors
        .iter()
        .fold(None, |best: Option<&Standing>, s| match best {
            Some(b) if b.bankroll >= s.bankroll => Some(b),
            _ => Some(s),
        })
}

fn print_summary(engine: &mut GameEngine, outcome: &GameOutcome) -> Result<()> {
    match top_player(&outcome.survivors) {
        None => engine.broadcast("All players went bankrupt"),
        Some(top) => {
            for s in &outcome.survivors {
                engine.broadcast(&format!(
                    "After {} rounds player {} has a bankroll of {}.",
                    outcome.rounds, s.name, s.bankroll
                ));
            }
            engine.broadcast(&format!("Top player at end of game: {}", top.name));
        }
    }

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:     {}", outcome.run_id);
    println!("  rounds:     {}", outcome.rounds);
    for s in &outcome.survivors {
        println!("  survivor:   {:<20} bankroll {:>6}", s.name, s.bankroll);
    }
    for s in &outcome.losers {
        let note = if s.connected { "" } else { " (disconnected)" };
        println!("  bankrupt:   {:<20} bankroll {:>6}{note}", s.name, s.bankroll);
    }
    let store = engine.store();
    println!("  missions:   {}", store.event_count(&outcome.run_id, "mission_resolved")?);
    println!("  no launch:  {}", store.event_count(&outcome.run_id, "no_launch")?);
    Ok(())
}

fn print_usage() {
    println!("smp [--seed N] [--rounds N] [--roster FILE] [--config FILE] [--db FILE] [--run-id ID]");
    println!("    [--replay RUN_ID] [--rpc-timeout MS] [--decision-timeout MS] [--json]");
    println!();
    println!("  --rounds 0 plays until at most one player is left.");
    println!("  --replay reuses the seed of a run stored in --db.");
    println!("  --decision-timeout bounds how long a remote seat may think per bid.");
    println!("  Roster files list {{\"name\", \"strategy\"}} entries; a strategy is");
    println!("  a policy name or [name@]host:port of a strategy-server.");
    println!("  Policies: {}, terminal", POLICY_NAMES.join(", "));
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
