//! The bet ledger: system of record for every money-related fact of an account.

use chrono::Local;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::id::BetIdGenerator;
use crate::domain::{round2, BetId, BetRecord, BetStatus, NewBet};
use crate::error::LedgerError;
use crate::validation::{validate_closing_odds, validate_odds, validate_stake};

/// Insertion-ordered collection of bet records owned by a single account
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<BetRecord>,
    ids: BetIdGenerator,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted records, keeping their stored order
    pub fn from_records(records: Vec<BetRecord>) -> Self {
        let ids = BetIdGenerator::seeded(records.iter().map(|r| &r.id));
        Self { records, ids }
    }

    pub fn records(&self) -> &[BetRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<BetRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: BetId) -> Option<&BetRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: BetId) -> Result<&mut BetRecord, LedgerError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(LedgerError::NotFound { id })
    }

    /// Add a new pending record with a fresh id greater than every existing one
    pub fn append(&mut self, bet: NewBet) -> Result<BetId, LedgerError> {
        validate_stake(bet.stake)?;
        validate_odds(bet.odds)?;

        let id = self.ids.next_id();
        let record = BetRecord {
            id,
            date: bet
                .date
                .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
            event: bet.event,
            pick: bet.pick,
            stake: round2(bet.stake),
            odds: bet.odds,
            closing_odds: None,
            segment: bet.segment,
            status: BetStatus::Pending,
            analysis_summary: bet.analysis_summary.unwrap_or_else(|| "Auto".to_string()),
        };

        info!(
            bet_id = %id,
            event = %record.event,
            stake = %record.stake,
            odds = %record.odds,
            "bet recorded"
        );
        self.records.push(record);
        Ok(id)
    }

    /// Settle a pending bet as won or lost. One-shot.
    pub fn resolve(&mut self, id: BetId, status: BetStatus) -> Result<(), LedgerError> {
        if !status.is_settled() {
            return Err(LedgerError::InvalidInput(format!(
                "bets resolve to won or lost, got {}",
                status
            )));
        }
        self.transition(id, status)
    }

    /// Cancel a pending bet; it stays visible but never counts
    pub fn void(&mut self, id: BetId) -> Result<(), LedgerError> {
        self.transition(id, BetStatus::Void)
    }

    fn transition(&mut self, id: BetId, to: BetStatus) -> Result<(), LedgerError> {
        let record = self.get_mut(id)?;
        if !record.status.can_transition_to(to) {
            return Err(LedgerError::InvalidTransition {
                id,
                from: record.status,
                to,
            });
        }
        record.status = to;
        info!(bet_id = %id, status = %to, profit = %record.profit(), "bet resolved");
        Ok(())
    }

    /// Attach or overwrite the closing price, regardless of status.
    /// A price at or below 1.0 is rejected and the record left as it was.
    pub fn set_closing_odds(&mut self, id: BetId, value: Decimal) -> Result<(), LedgerError> {
        let record = self.get_mut(id)?;
        validate_closing_odds(value)?;
        record.closing_odds = Some(value);
        debug!(bet_id = %id, closing_odds = %value, "closing odds set");
        Ok(())
    }

    /// Delete a record. Other ids are untouched.
    pub fn remove(&mut self, id: BetId) -> Result<BetRecord, LedgerError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound { id })?;
        let removed = self.records.remove(index);
        info!(bet_id = %id, "bet removed");
        Ok(removed)
    }

    /// Sum of profit over won and lost records
    pub fn realized_profit(&self) -> Decimal {
        round2(
            self.settled()
                .map(BetRecord::profit)
                .fold(Decimal::ZERO, Decimal::saturating_add),
        )
    }

    pub fn settled(&self) -> impl Iterator<Item = &BetRecord> {
        self.records.iter().filter(|r| r.is_settled())
    }

    pub fn pending(&self) -> impl Iterator<Item = &BetRecord> {
        self.records
            .iter()
            .filter(|r| r.status == BetStatus::Pending)
    }

    /// Records in ascending id order, the authoritative chronological order
    pub fn chronological(&self) -> Vec<&BetRecord> {
        let mut ordered: Vec<&BetRecord> = self.records.iter().collect();
        ordered.sort_by_key(|r| r.id);
        ordered
    }
}
