//! Closing-line value tracking
//!
//! `edge = (odds / closing_odds - 1) * 100`. Positive means the price taken
//! beat the market's final price.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{round2, BetId, BetRecord, BetStatus};

/// CLV edge in percent, `None` when the closing price cannot be divided by
pub fn clv_edge(odds: Decimal, closing_odds: Decimal) -> Option<Decimal> {
    if closing_odds <= Decimal::ZERO {
        return None;
    }
    (odds.checked_div(closing_odds)? - Decimal::ONE).checked_mul(dec!(100))
}

/// Per-bet CLV line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClvEntry {
    pub bet_id: BetId,
    pub event: String,
    pub status: BetStatus,
    pub odds: Decimal,
    pub closing_odds: Decimal,
    /// Rounded to two decimals
    pub edge_percent: Decimal,
}

impl ClvEntry {
    pub fn beat_close(&self) -> bool {
        self.edge_percent > Decimal::ZERO
    }
}

/// Portfolio-level CLV over every record carrying a closing price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClvSummary {
    pub tracked: u32,
    pub beat_close: u32,
    /// Mean edge in percent; `None` when no record has a closing price
    pub average_edge: Option<Decimal>,
}

impl ClvSummary {
    /// Share of tracked bets that beat the close, in percent
    pub fn beat_close_rate(&self) -> Decimal {
        if self.tracked == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.beat_close) / Decimal::from(self.tracked) * dec!(100)
    }
}

/// CLV lines in ledger order, skipping records without a closing price
pub fn clv_entries<'a>(records: impl IntoIterator<Item = &'a BetRecord>) -> Vec<ClvEntry> {
    records
        .into_iter()
        .filter_map(|r| {
            let closing = r.closing_odds?;
            let edge = clv_edge(r.odds, closing)?;
            Some(ClvEntry {
                bet_id: r.id,
                event: r.event.clone(),
                status: r.status,
                odds: r.odds,
                closing_odds: closing,
                edge_percent: round2(edge),
            })
        })
        .collect()
}

/// Average CLV, using the unrounded per-bet edges
pub fn clv_summary<'a>(records: impl IntoIterator<Item = &'a BetRecord>) -> ClvSummary {
    let edges: Vec<Decimal> = records.into_iter().filter_map(BetRecord::clv_edge).collect();
    if edges.is_empty() {
        return ClvSummary::default();
    }

    let tracked = edges.len() as u32;
    let beat_close = edges.iter().filter(|e| **e > Decimal::ZERO).count() as u32;
    let total = edges.iter().copied().fold(Decimal::ZERO, Decimal::saturating_add);

    ClvSummary {
        tracked,
        beat_close,
        average_edge: Some(round2(total / Decimal::from(tracked))),
    }
}
