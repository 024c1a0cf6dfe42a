//! Bet ledger commands
//!
//! betsmart bet add      - Record a pending bet
//! betsmart bet resolve  - Settle a pending bet as won or lost
//! betsmart bet void     - Cancel a pending bet
//! betsmart bet closing  - Attach the closing price
//! betsmart bet remove   - Delete a bet
//! betsmart bet list     - Show the ledger

use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

use super::output::{self, BetRow, Notice, OutputMode};
use crate::domain::{BetId, BetStatus, NewBet};
use crate::services::AccountSession;

#[derive(Subcommand, Debug)]
pub enum BetCommands {
    /// Record a pending bet (stake in the display currency)
    Add {
        /// Event label, e.g. "Arsenal vs Chelsea"
        event: String,
        /// Market or pick label
        pick: String,
        #[arg(short, long)]
        stake: Decimal,
        /// Decimal odds (> 1.0)
        #[arg(short, long)]
        odds: Decimal,
        /// Sport tag (SOCCER, NBA, TENNIS, MLB, OTHER or custom)
        #[arg(long)]
        sport: Option<String>,
        /// Display date (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Analysis summary to keep with the bet
        #[arg(long)]
        summary: Option<String>,
    },

    /// Settle a pending bet
    Resolve {
        id: BetId,
        /// won or lost
        status: BetStatus,
    },

    /// Cancel a pending bet; it stays listed but never counts
    Void { id: BetId },

    /// Set the closing odds of a bet
    Closing {
        id: BetId,
        /// Decimal closing odds (> 1.0); anything else is ignored
        odds: String,
    },

    /// Delete a bet permanently
    Remove { id: BetId },

    /// List bets in ledger order
    List {
        /// Only show bets with this status
        #[arg(short, long)]
        status: Option<BetStatus>,
    },
}

impl BetCommands {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    pub async fn run(self, session: &mut AccountSession, mode: OutputMode) -> Result<()> {
        match self {
            Self::Add {
                event,
                pick,
                stake,
                odds,
                sport,
                date,
                summary,
            } => {
                let mut bet = NewBet::new(event, pick, stake, odds);
                if let Some(sport) = sport {
                    bet = bet.with_segment(sport);
                }
                if let Some(date) = date {
                    bet = bet.with_date(date);
                }
                if let Some(summary) = summary {
                    bet = bet.with_summary(summary);
                }
                let id = session.add_bet_in_display(bet).await?;
                output::notify(Notice::Done, &format!("Recorded bet {id}"));
            }
            Self::Resolve { id, status } => {
                session.resolve(id, status).await?;
                output::notify(Notice::Done, &format!("Bet {id} settled as {status}"));
            }
            Self::Void { id } => {
                session.void(id).await?;
                output::notify(Notice::Done, &format!("Bet {id} voided"));
            }
            Self::Closing { id, odds } => {
                if session.set_closing_odds_from_input(id, &odds).await {
                    let edge = session
                        .ledger()
                        .get(id)
                        .and_then(|b| b.clv_edge())
                        .unwrap_or(Decimal::ZERO);
                    output::notify(Notice::Done, &format!("Closing odds set, CLV {:.2}%", edge));
                } else {
                    output::notify(
                        Notice::Ignored,
                        &format!("Closing odds '{odds}' ignored for bet {id}"),
                    );
                }
            }
            Self::Remove { id } => {
                let removed = session.remove(id).await?;
                output::notify(Notice::Done, &format!("Removed bet {id} ({})", removed.event));
            }
            Self::List { status } => {
                let exchange = session.exchange();
                let rows: Vec<BetRow> = session
                    .ledger()
                    .records()
                    .iter()
                    .filter(|b| status.map_or(true, |s| b.status == s))
                    .map(|b| BetRow::new(b, exchange))
                    .collect();
                output::print_rows(&rows, mode, "No bets recorded")?;
            }
        }
        Ok(())
    }
}
