//! BetSmart CLI - bankroll ledger and staking analytics
//!
//! Commands:
//! - `betsmart bet` - Record, settle and annotate bets
//! - `betsmart bankroll` - Show or edit the bankroll and display currency
//! - `betsmart kelly` - Fractional Kelly stake recommendation
//! - `betsmart stats | equity | clv | export` - Read-side reports

pub mod bankroll;
pub mod bet;
pub mod output;
pub mod report;
pub mod staking;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::services::GUEST_ACCOUNT;
use crate::strategy::RiskProfile;

/// Sports-betting bankroll manager
#[derive(Parser, Debug)]
#[command(name = "betsmart")]
#[command(author, version, about = "Bankroll ledger, Kelly staking and betting performance analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Account whose ledger to use (GUEST is never saved)
    #[arg(short, long, global = true, env = "BETSMART_ACCOUNT", default_value = GUEST_ACCOUNT)]
    pub account: String,

    /// Configuration directory
    #[arg(short, long, global = true, default_value = "config")]
    pub config: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record, settle and annotate bets
    #[command(subcommand)]
    Bet(bet::BetCommands),

    /// Show or edit the bankroll
    #[command(subcommand)]
    Bankroll(bankroll::BankrollCommands),

    /// Recommend a stake with fractional Kelly
    Kelly {
        /// Decimal odds offered
        odds: String,
        /// Believed win probability in percent (0-100)
        win_prob: String,
        /// Risk profile (defaults to the configured one)
        #[arg(short, long)]
        profile: Option<RiskProfile>,
        /// Use the raw probability instead of the 5% haircut
        #[arg(long)]
        no_safety_margin: bool,
        /// Bankroll to size against, display currency (defaults to current)
        #[arg(short, long)]
        bankroll: Option<Decimal>,
    },

    /// Overall and per-sport performance
    Stats,

    /// Bankroll over settled bets
    Equity,

    /// Closing-line value per bet and on average
    Clv,

    /// Export the ledger as CSV
    Export {
        /// Output file (defaults to betsmart_<account>_<date>.csv)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

impl Commands {
    /// Commands that never touch the ledger get quiet logging
    pub fn is_read_only(&self) -> bool {
        match self {
            Commands::Bet(cmd) => cmd.is_read_only(),
            Commands::Bankroll(cmd) => cmd.is_read_only(),
            Commands::Kelly { .. }
            | Commands::Stats
            | Commands::Equity
            | Commands::Clv
            | Commands::Export { .. } => true,
        }
    }
}
