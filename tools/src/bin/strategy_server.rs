//! strategy-server: hosts one strategy for remote games.
//!
//! Usage:
//!   strategy-server 49000                  # terminal prompts on port 49000
//!   strategy-server 2 --policy sponge_bob  # port 49002
//!   strategy-server --policy ev_bot --port 49003
//!
//! Ports up to 1024 are read as a player number and offset by 49000.

use anyhow::{bail, Result};
use smp_core::{remote::StrategyServer, strategy::{policy_by_name, Strategy}};
use smp_runner::terminal::Terminal;
use std::{env, net::TcpListener};

const PORT_BASE: u16 = 49000;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(port_arg) = flag_value(&args, "--port").or_else(|| positional(&args).first().copied()) else {
        bail!("Specify either the port number (> 1024) or the player number (<= 1024)!");
    };
    let port = resolve_port(port_arg)?;
    let host = flag_value(&args, "--host").unwrap_or("0.0.0.0");
    let policy = flag_value(&args, "--policy").unwrap_or("terminal");

    let strategy: Box<dyn Strategy> = match policy {
        "terminal" | "Terminal" | "human" => Box::new(Terminal),
        name => match policy_by_name(name) {
            Some(s) => s,
            None => bail!("Unknown policy '{name}'"),
        },
    };

    let listener = TcpListener::bind((host, port))?;
    println!("Listening on {}", listener.local_addr()?);
    log::info!("serving policy '{policy}'");
    let mut server = StrategyServer::new(strategy);
    server.serve(&listener)?;
    Ok(())
}

/// Every flag here takes a value.
const FLAGS: &[&str] = &["--port", "--host", "--policy"];

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments left once flags and their values are skipped.
fn positional(args: &[String]) -> Vec<&str> {
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else {
            rest.push(arg.as_str());
        }
    }
    rest
}

fn resolve_port(arg: &str) -> Result<u16> {
    let n: u16 = arg.parse()?;
    if n <= 1024 {
        match PORT_BASE.checked_add(n) {
            Some(port) => Ok(port),
            None => bail!("player number {n} is out of range"),
        }
    } else {
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn port_may_follow_flags() {
        let a = args(&["--policy", "sponge_bob", "2"]);
        assert_eq!(positional(&a), vec!["2"]);
        assert_eq!(flag_value(&a, "--policy"), Some("sponge_bob"));
        assert_eq!(resolve_port(positional(&a)[0]).unwrap(), 49002);

        let a = args(&["--port", "50000", "--host", "127.0.0.1"]);
        assert!(positional(&a).is_empty());
        assert_eq!(resolve_port(flag_value(&a, "--port").unwrap()).unwrap(), 50000);
    }

    #[test]
    fn small_ports_are_player_numbers() {
        assert_eq!(resolve_port("0").unwrap(), 49000);
        assert_eq!(resolve_port("1024").unwrap(), 50024);
        assert_eq!(resolve_port("49001").unwrap(), 49001);
        assert!(resolve_port("ten").is_err());
    }
}
