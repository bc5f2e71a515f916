//! A human at the keyboard, prompted for every decision.

use dialoguer::{Confirm, Input};
use smp_core::{
    error::{StrategyError, StrategyResult},
    public_info::PublicInformation,
    strategy::{Bid, PrivateInformation, Strategy},
};

/// Fault code reported when the terminal cannot be read.
pub const FAULT_TERMINAL: i64 = 10;

#[derive(Debug, Default)]
pub struct Terminal;

impl Terminal {
    fn show(&self, private: &PrivateInformation, public: &PublicInformation) {
        println!("-------------");
        println!("{} up.", private.name);
        match serde_json::to_string_pretty(public) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{public:?}"),
        }
        println!("Your tech: {}", private.tech);
        println!("Your money: {}", private.bankroll);
    }

    fn confirm(&self, prompt: &str) -> StrategyResult<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(input_fault)
    }
}

fn input_fault(e: dialoguer::Error) -> StrategyError {
    StrategyError::Fault { code: FAULT_TERMINAL, message: e.to_string() }
}

/// Non-numeric input bids nothing.
pub fn parse_bid(input: &str) -> i64 {
    input.trim().parse::<u32>().map(i64::from).unwrap_or(0)
}

impl Strategy for Terminal {
    fn label(&self) -> String {
        "terminal".into()
    }

    fn bid(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Bid> {
        self.show(private, public);
        let amount: String = Input::new()
            .with_prompt("Enter bid")
            .allow_empty(true)
            .interact_text()
            .map_err(input_fault)?;
        let launching = self.confirm("Launch?")?;
        Ok(Bid::new(parse_bid(&amount), launching))
    }

    fn join_launch(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<bool> {
        self.show(private, public);
        self.confirm("Join launch?")
    }

    fn broadcast(&mut self, message: &str) -> StrategyResult<()> {
        println!("{message}");
        Ok(())
    }
}
