//! Bankroll-over-time replay of the ledger
//!
//! Settled bets are replayed in ascending id order starting from
//! `(0, initial_bankroll)`. Pending and void records produce no point.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{round2, saturating_div, BetId, BetRecord, ExchangeContext};
use crate::ledger::Ledger;

/// Fallback y-range when every point has the same value
const FLAT_RANGE: Decimal = dec!(10);
const UPPER_PAD: Decimal = dec!(1.05);
const LOWER_PAD: Decimal = dec!(0.95);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub index: u32,
    pub value: Decimal,
    /// Bet that produced this point; `None` for the starting point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_id: Option<BetId>,
}

/// Padded y-extent used to map the curve onto a 0-100 canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityBounds {
    pub min_y: Decimal,
    pub max_y: Decimal,
    pub range: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    /// Replay records in ascending id order.
    ///
    /// `initial` is in the unit the curve is drawn in; bet profits are
    /// multiplied by `unit_factor` to reach that unit.
    pub fn build<'a>(
        records: impl IntoIterator<Item = &'a BetRecord>,
        initial: Decimal,
        unit_factor: Decimal,
    ) -> Self {
        let mut settled: Vec<&BetRecord> = records.into_iter().filter(|r| r.is_settled()).collect();
        settled.sort_by_key(|r| r.id);

        let mut running = round2(initial);
        let mut points = Vec::with_capacity(settled.len() + 1);
        points.push(EquityPoint {
            index: 0,
            value: running,
            bet_id: None,
        });

        for (i, bet) in settled.into_iter().enumerate() {
            let delta = round2(bet.profit().saturating_mul(unit_factor));
            running = round2(running.saturating_add(delta));
            points.push(EquityPoint {
                index: i as u32 + 1,
                value: running,
                bet_id: Some(bet.id),
            });
        }

        Self { points }
    }

    /// Curve in the display currency, starting from a display-unit bankroll
    pub fn from_ledger(ledger: &Ledger, initial_display: Decimal, exchange: &ExchangeContext) -> Self {
        Self::build(ledger.records(), initial_display, exchange.unit_factor())
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A curve needs at least one settled bet besides the starting point
    pub fn is_renderable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn final_value(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.value)
    }

    pub fn bounds(&self) -> Option<EquityBounds> {
        if !self.is_renderable() {
            return None;
        }
        let max = self.points.iter().map(|p| p.value).max()?;
        let min = self.points.iter().map(|p| p.value).min()?;

        let max_y = max.saturating_mul(UPPER_PAD);
        let min_y = min.saturating_mul(LOWER_PAD);
        let range = max_y.saturating_sub(min_y);
        let range = if range <= Decimal::ZERO { FLAT_RANGE } else { range };

        Some(EquityBounds { min_y, max_y, range })
    }

    /// Points mapped onto a 0-100 canvas (y grows downwards). Empty when the
    /// curve is not renderable.
    pub fn normalized(&self) -> Vec<(Decimal, Decimal)> {
        let Some(bounds) = self.bounds() else {
            return Vec::new();
        };
        let span = Decimal::from((self.points.len() - 1).max(1) as u64);

        self.points
            .iter()
            .map(|p| {
                let x = Decimal::from(p.index) / span * dec!(100);
                let share = saturating_div(p.value.saturating_sub(bounds.min_y), bounds.range);
                let y = dec!(100).saturating_sub(share.saturating_mul(dec!(100)));
                (x, y)
            })
            .collect()
    }

    /// Largest peak-to-trough fall along the curve
    pub fn max_drawdown(&self) -> Decimal {
        let mut peak: Option<Decimal> = None;
        let mut max_dd = Decimal::ZERO;
        for point in &self.points {
            let top = peak.map_or(point.value, |p| p.max(point.value));
            peak = Some(top);
            let dd = top.saturating_sub(point.value);
            if dd > max_dd {
                max_dd = dd;
            }
        }
        max_dd
    }
}
