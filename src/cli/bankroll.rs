//! Bankroll commands
//!
//! betsmart bankroll show      - Base, realized profit and current capital
//! betsmart bankroll set       - Make the displayed total a given amount
//! betsmart bankroll rate      - Show the bankroll at another exchange rate
//! betsmart bankroll currency  - Show the bankroll in another currency

use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Serialize;

use super::output::{self, Notice, OutputMode};
use crate::domain::Currency;
use crate::services::AccountSession;

#[derive(Subcommand, Debug)]
pub enum BankrollCommands {
    /// Show the bankroll
    Show,

    /// Set the displayed total; realized profit is kept
    Set {
        /// Amount in the display currency
        amount: String,
    },

    /// Use another COP/USD rate for this invocation
    Rate { rate: String },

    /// Use another display currency for this invocation
    Currency { currency: Currency },
}

#[derive(Debug, Serialize)]
struct BankrollView {
    account: String,
    currency: Currency,
    exchange_rate: Decimal,
    base_capital: String,
    realized_profit: String,
    current_capital: String,
    pending_bets: u32,
}

impl BankrollView {
    fn new(session: &AccountSession) -> Self {
        let summary = session.summary();
        Self {
            account: session.account_id().to_string(),
            currency: session.exchange().display_currency(),
            exchange_rate: session.exchange().rate(),
            base_capital: session.format(summary.base_capital),
            realized_profit: session.format(summary.realized_profit),
            current_capital: session.format(summary.current_capital),
            pending_bets: summary.pending,
        }
    }
}

impl BankrollCommands {
    pub fn is_read_only(&self) -> bool {
        !matches!(self, Self::Set { .. })
    }

    pub async fn run(self, session: &mut AccountSession, mode: OutputMode) -> Result<()> {
        match self {
            Self::Show => {}
            Self::Set { amount } => {
                if !session.edit_displayed_total(&amount).await {
                    output::notify(Notice::Ignored, &format!("Bankroll '{amount}' ignored"));
                }
            }
            Self::Rate { rate } => {
                if !session.set_exchange_rate(&rate) {
                    output::notify(Notice::Ignored, &format!("Exchange rate '{rate}' ignored"));
                }
            }
            Self::Currency { currency } => session.set_display_currency(currency),
        }
        output::print_fields(&BankrollView::new(session), mode)
    }
}
