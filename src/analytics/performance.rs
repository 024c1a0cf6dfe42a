//! Profitability statistics over settled bets, overall and per segment

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::clv::{clv_summary, ClvSummary};
use crate::domain::{round2, saturating_div, BetRecord, BetStatus, ExchangeContext, Segment};
use crate::ledger::{BankrollState, Ledger};

/// Totals over a set of settled bets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_bets: u32,
    pub won: u32,
    /// Sum of stakes
    pub invested: Decimal,
    /// Sum of `stake * odds` over won bets
    pub returned: Decimal,
}

impl PerformanceStats {
    /// Fold one record in; pending and void records are ignored
    pub fn record(&mut self, bet: &BetRecord) {
        if !bet.is_settled() {
            return;
        }
        self.total_bets += 1;
        self.invested = round2(self.invested.saturating_add(bet.stake));
        if bet.status == BetStatus::Won {
            self.won += 1;
            self.returned = round2(self.returned.saturating_add(bet.returned()));
        }
    }

    pub fn lost(&self) -> u32 {
        self.total_bets - self.won
    }

    pub fn profit(&self) -> Decimal {
        round2(self.returned.saturating_sub(self.invested))
    }

    /// Return on investment in percent
    pub fn roi(&self) -> Decimal {
        if self.invested <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        saturating_div(self.profit(), self.invested).saturating_mul(dec!(100))
    }

    /// Win rate in percent
    pub fn win_rate(&self) -> Decimal {
        if self.total_bets == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.won) / Decimal::from(self.total_bets) * dec!(100)
    }

    /// Same counts with amounts multiplied into another unit
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            total_bets: self.total_bets,
            won: self.won,
            invested: round2(self.invested.saturating_mul(factor)),
            returned: round2(self.returned.saturating_mul(factor)),
        }
    }
}

impl<'a> FromIterator<&'a BetRecord> for PerformanceStats {
    fn from_iter<I: IntoIterator<Item = &'a BetRecord>>(iter: I) -> Self {
        let mut stats = PerformanceStats::default();
        for bet in iter {
            stats.record(bet);
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub segment: Segment,
    #[serde(flatten)]
    pub stats: PerformanceStats,
}

/// Overall figures plus one row per segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub overall: PerformanceStats,
    /// First-seen order among settled bets replayed by ascending id
    pub segments: Vec<SegmentStats>,
}

impl PerformanceReport {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self::from_records(ledger.chronological())
    }

    /// Build from records in the order they should be replayed
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BetRecord>) -> Self {
        let mut report = PerformanceReport::default();
        for bet in records.into_iter().filter(|b| b.is_settled()) {
            report.overall.record(bet);

            let segment = bet.segment_or_other();
            match report.segments.iter_mut().find(|s| s.segment == segment) {
                Some(row) => row.stats.record(bet),
                None => {
                    let mut stats = PerformanceStats::default();
                    stats.record(bet);
                    report.segments.push(SegmentStats { segment, stats });
                }
            }
        }
        report
    }

    pub fn segment(&self, segment: &Segment) -> Option<&PerformanceStats> {
        self.segments
            .iter()
            .find(|s| &s.segment == segment)
            .map(|s| &s.stats)
    }

    /// Amounts converted to the display currency; ratios are unchanged
    pub fn in_display_units(&self, exchange: &ExchangeContext) -> Self {
        let factor = exchange.unit_factor();
        Self {
            overall: self.overall.scaled(factor),
            segments: self
                .segments
                .iter()
                .map(|s| SegmentStats {
                    segment: s.segment.clone(),
                    stats: s.stats.scaled(factor),
                })
                .collect(),
        }
    }
}

/// Dashboard headline figures, internal currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub overall: PerformanceStats,
    pub pending: u32,
    pub void: u32,
    pub base_capital: Decimal,
    pub realized_profit: Decimal,
    pub current_capital: Decimal,
    pub clv: ClvSummary,
}

impl LedgerSummary {
    pub fn compute(ledger: &Ledger, bankroll: &BankrollState) -> Self {
        let count = |status: BetStatus| {
            ledger
                .records()
                .iter()
                .filter(|r| r.status == status)
                .count() as u32
        };

        Self {
            overall: ledger.records().iter().collect(),
            pending: count(BetStatus::Pending),
            void: count(BetStatus::Void),
            base_capital: bankroll.base_capital(),
            realized_profit: ledger.realized_profit(),
            current_capital: bankroll.current_capital(ledger),
            clv: clv_summary(ledger.records()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, NewBet};

    fn settle(ledger: &mut Ledger, bet: NewBet, status: BetStatus) {
        let id = ledger.append(bet).unwrap();
        if status.is_settled() {
            ledger.resolve(id, status).unwrap();
        } else if status == BetStatus::Void {
            ledger.void(id).unwrap();
        }
    }

    #[test]
    fn test_soccer_segment_breakeven() {
        let mut ledger = Ledger::new();
        let soccer = |stake| NewBet::new("A vs B", "A", stake, dec!(2.0)).with_segment("SOCCER");
        settle(&mut ledger, soccer(dec!(100)), BetStatus::Won);
        settle(&mut ledger, soccer(dec!(100)), BetStatus::Lost);

        let report = PerformanceReport::from_ledger(&ledger);
        let stats = report.segment(&Segment::Soccer).unwrap();
        assert_eq!(stats.total_bets, 2);
        assert_eq!(stats.won, 1);
        assert_eq!(stats.invested, dec!(200));
        assert_eq!(stats.returned, dec!(200));
        assert_eq!(stats.profit(), dec!(0));
        assert_eq!(stats.roi(), dec!(0));
        assert_eq!(stats.win_rate(), dec!(50));
    }

    #[test]
    fn test_pending_and_void_excluded() {
        let mut ledger = Ledger::new();
        settle(
            &mut ledger,
            NewBet::new("x", "y", dec!(40), dec!(2.5)).with_segment("NBA"),
            BetStatus::Won,
        );
        settle(
            &mut ledger,
            NewBet::new("x", "y", dec!(500), dec!(2.5)).with_segment("NBA"),
            BetStatus::Void,
        );
        settle(
            &mut ledger,
            NewBet::new("x", "y", dec!(70), dec!(2.5)).with_segment("TENNIS"),
            BetStatus::Pending,
        );

        let report = PerformanceReport::from_ledger(&ledger);
        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.overall.total_bets, 1);
        assert_eq!(report.overall.invested, dec!(40));
        assert_eq!(report.overall.profit(), dec!(60));
        assert_eq!(report.overall.roi(), dec!(150));
        assert_eq!(report.overall.win_rate(), dec!(100));
    }

    #[test]
    fn test_segments_first_seen_order_and_other_default() {
        let mut ledger = Ledger::new();
        settle(&mut ledger, NewBet::new("a", "a", dec!(10), dec!(2)).with_segment("TENNIS"), BetStatus::Lost);
        settle(&mut ledger, NewBet::new("b", "b", dec!(10), dec!(2)), BetStatus::Won);
        settle(&mut ledger, NewBet::new("c", "c", dec!(10), dec!(2)).with_segment("tennis"), BetStatus::Won);
        settle(&mut ledger, NewBet::new("d", "d", dec!(10), dec!(2)).with_segment("MLB"), BetStatus::Lost);

        let report = PerformanceReport::from_ledger(&ledger);
        let order: Vec<&Segment> = report.segments.iter().map(|s| &s.segment).collect();
        assert_eq!(order, vec![&Segment::Tennis, &Segment::Other, &Segment::Mlb]);
        assert_eq!(report.segment(&Segment::Tennis).unwrap().total_bets, 2);
    }

    #[test]
    fn test_empty_ledger_is_neutral() {
        let report = PerformanceReport::from_ledger(&Ledger::new());
        assert!(report.segments.is_empty());
        assert_eq!(report.overall.roi(), dec!(0));
        assert_eq!(report.overall.win_rate(), dec!(0));
    }

    #[test]
    fn test_display_units_keep_ratios() {
        let mut ledger = Ledger::new();
        settle(&mut ledger, NewBet::new("a", "a", dec!(10), dec!(1.5)), BetStatus::Won);
        settle(&mut ledger, NewBet::new("b", "b", dec!(10), dec!(1.5)), BetStatus::Lost);

        let report = PerformanceReport::from_ledger(&ledger);
        let cop = ExchangeContext::new(Currency::Cop, dec!(4000)).unwrap();
        let shown = report.in_display_units(&cop);
        assert_eq!(shown.overall.invested, dec!(80000));
        assert_eq!(shown.overall.profit(), dec!(-20000));
        assert_eq!(shown.overall.roi(), report.overall.roi());
        assert_eq!(shown.overall.win_rate(), dec!(50));
    }

    #[test]
    fn test_summary_matches_bankroll() {
        let mut ledger = Ledger::new();
        settle(&mut ledger, NewBet::new("a", "a", dec!(100), dec!(2.0)), BetStatus::Won);
        settle(&mut ledger, NewBet::new("b", "b", dec!(50), dec!(1.9)), BetStatus::Lost);
        settle(&mut ledger, NewBet::new("c", "c", dec!(20), dec!(1.9)), BetStatus::Pending);

        let summary = LedgerSummary::compute(&ledger, &BankrollState::new(dec!(1000)));
        assert_eq!(summary.realized_profit, dec!(50));
        assert_eq!(summary.current_capital, dec!(1050));
        assert_eq!(summary.overall.profit(), summary.realized_profit);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.void, 0);
        assert_eq!(summary.clv.tracked, 0);
    }
}
