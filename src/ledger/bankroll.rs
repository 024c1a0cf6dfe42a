use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::book::Ledger;
use crate::domain::round2;

/// Starting capital of an account, in the internal currency.
///
/// The current bankroll is never stored: it is always
/// `base_capital + ledger.realized_profit()`, so adding or editing bets can
/// not double count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankrollState {
    base_capital: Decimal,
}

impl BankrollState {
    pub fn new(base_capital: Decimal) -> Self {
        Self {
            base_capital: round2(base_capital),
        }
    }

    pub fn base_capital(&self) -> Decimal {
        self.base_capital
    }

    pub fn current_capital(&self, ledger: &Ledger) -> Decimal {
        round2(self.base_capital.saturating_add(ledger.realized_profit()))
    }

    /// Move the base so the current total becomes `requested_total` while the
    /// profit already realized stays on the books. Returns the new base.
    pub fn rebase_to_total(&mut self, requested_total: Decimal, ledger: &Ledger) -> Decimal {
        let realized = ledger.realized_profit();
        let new_base = round2(requested_total.saturating_sub(realized));
        info!(
            old_base = %self.base_capital,
            new_base = %new_base,
            realized = %realized,
            "bankroll rebased"
        );
        self.base_capital = new_base;
        new_base
    }
}
