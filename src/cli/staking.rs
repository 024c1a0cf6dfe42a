//! `betsmart kelly` - stake sizing against the current bankroll

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use super::output::{self, Notice, OutputMode};
use crate::domain::{parse_decimal, round2};
use crate::services::AccountSession;
use crate::strategy::{KellyCalculator, StakeRecommendation, StakeRequest};

#[derive(Debug, Serialize)]
struct KellyView {
    profile: String,
    safety_margin: bool,
    bankroll: String,
    full_kelly_percent: Decimal,
    stake_percent: Decimal,
    stake: String,
    high_risk: bool,
}

pub fn run(
    session: &AccountSession,
    calculator: &KellyCalculator,
    odds: &str,
    win_prob: &str,
    bankroll: Option<Decimal>,
    mode: OutputMode,
) -> Result<()> {
    let decimal_odds = parse_decimal(odds);
    let win_pct = parse_decimal(win_prob);
    let (bankroll, rec): (Decimal, StakeRecommendation) = match bankroll {
        Some(bankroll) => {
            let request = StakeRequest {
                bankroll: Some(bankroll),
                decimal_odds,
                win_probability_percent: win_pct,
            };
            (bankroll, calculator.recommend(&request))
        }
        None => (
            session.display_current_capital(),
            session.recommend_stake(calculator, decimal_odds, win_pct),
        ),
    };
    let currency = session.exchange().display_currency();

    let view = KellyView {
        profile: format!(
            "{} ({})",
            calculator.risk_profile,
            calculator.risk_profile.label()
        ),
        safety_margin: calculator.use_safety_margin,
        bankroll: currency.format(bankroll),
        full_kelly_percent: round2(rec.full_kelly_fraction * Decimal::ONE_HUNDRED),
        stake_percent: rec.bankroll_percent,
        stake: currency.format(rec.stake),
        high_risk: rec.high_risk,
    };
    output::print_fields(&view, mode)?;

    if mode == OutputMode::Table {
        if !rec.has_edge() {
            output::notify(Notice::Caution, "No positive edge: do not bet");
        } else if rec.high_risk {
            output::notify(Notice::Caution, "Stake exceeds 5% of bankroll");
        }
    }
    Ok(())
}
