//! Per-account session: ledger, bankroll and exchange context for one
//! account, with write-through persistence.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analytics::{
    clv_entries, ClvEntry, EquityCurve, LedgerSummary, PerformanceReport,
};
use crate::config::AppConfig;
use crate::domain::{parse_decimal, BetId, BetRecord, BetStatus, Currency, ExchangeContext, NewBet};
use crate::error::Result;
use crate::ledger::{BankrollState, Ledger};
use crate::persistence::{AccountDirectory, LedgerStore};
use crate::strategy::{KellyCalculator, StakeRecommendation, StakeRequest};
use crate::validation::validate_bankroll;

/// Account that works entirely in memory and is never persisted
pub const GUEST_ACCOUNT: &str = "GUEST";

/// Values a session starts from when storage has nothing better
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub base_capital: Decimal,
    pub exchange: ExchangeContext,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            base_capital: Decimal::ONE_THOUSAND,
            exchange: ExchangeContext::internal(),
        }
    }
}

impl From<&AppConfig> for SessionDefaults {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_capital: config.bankroll.default_base_capital,
            exchange: config.display.exchange_context(),
        }
    }
}

pub struct AccountSession {
    account_id: String,
    ledger: Ledger,
    bankroll: BankrollState,
    exchange: ExchangeContext,
    store: Arc<dyn LedgerStore>,
    directory: Arc<dyn AccountDirectory>,
}

impl AccountSession {
    /// Load an account's ledger and starting bankroll
    pub async fn open(
        account_id: impl Into<String>,
        store: Arc<dyn LedgerStore>,
        directory: Arc<dyn AccountDirectory>,
        defaults: SessionDefaults,
    ) -> Result<Self> {
        let account_id = account_id.into();
        let is_guest = account_id == GUEST_ACCOUNT;

        let (records, base) = if is_guest {
            (Vec::new(), None)
        } else {
            let records = store.load(&account_id).await?;
            let base = directory.resolve_starting_bankroll(&account_id).await?;
            (records, base)
        };

        let base = base.unwrap_or(defaults.base_capital);
        let ledger = Ledger::from_records(records);
        info!(
            account = %account_id,
            bets = ledger.len(),
            base_capital = %base,
            guest = is_guest,
            "Account session opened"
        );

        Ok(Self {
            account_id,
            ledger,
            bankroll: BankrollState::new(base),
            exchange: defaults.exchange,
            store,
            directory,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn is_guest(&self) -> bool {
        self.account_id == GUEST_ACCOUNT
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn bankroll(&self) -> &BankrollState {
        &self.bankroll
    }

    pub fn exchange(&self) -> &ExchangeContext {
        &self.exchange
    }

    // =========================================================================
    // Ledger mutations (write-through)
    // =========================================================================

    /// Record a bet whose stake is already in the internal currency
    pub async fn add_bet(&mut self, bet: NewBet) -> Result<BetId> {
        let id = self.ledger.append(bet)?;
        self.persist().await;
        Ok(id)
    }

    /// Record a bet whose stake was typed in the display currency
    pub async fn add_bet_in_display(&mut self, mut bet: NewBet) -> Result<BetId> {
        bet.stake = self.exchange.to_internal(bet.stake);
        self.add_bet(bet).await
    }

    pub async fn resolve(&mut self, id: BetId, status: BetStatus) -> Result<()> {
        self.ledger.resolve(id, status)?;
        self.persist().await;
        Ok(())
    }

    pub async fn void(&mut self, id: BetId) -> Result<()> {
        self.ledger.void(id)?;
        self.persist().await;
        Ok(())
    }

    pub async fn set_closing_odds(&mut self, id: BetId, value: Decimal) -> Result<()> {
        self.ledger.set_closing_odds(id, value)?;
        self.persist().await;
        Ok(())
    }

    /// Interactive variant: unparsable or out-of-domain input is a logged no-op
    pub async fn set_closing_odds_from_input(&mut self, id: BetId, input: &str) -> bool {
        let Some(value) = parse_decimal(input) else {
            warn!(account = %self.account_id, bet_id = %id, input, "Ignoring non-numeric closing odds");
            return false;
        };
        match self.set_closing_odds(id, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!(account = %self.account_id, bet_id = %id, "{}", e);
                false
            }
        }
    }

    pub async fn remove(&mut self, id: BetId) -> Result<BetRecord> {
        let removed = self.ledger.remove(id)?;
        self.persist().await;
        Ok(removed)
    }

    /// Save the ledger; a failed save is logged and the in-memory state kept
    async fn persist(&self) {
        if self.is_guest() {
            return;
        }
        match self.store.save(&self.account_id, self.ledger.records()).await {
            Ok(()) => debug!(account = %self.account_id, "Ledger saved"),
            Err(e) => warn!(account = %self.account_id, error = %e, "Ledger save failed"),
        }
    }

    // =========================================================================
    // Bankroll and currency
    // =========================================================================

    /// Internal currency
    pub fn current_capital(&self) -> Decimal {
        self.bankroll.current_capital(&self.ledger)
    }

    pub fn display_current_capital(&self) -> Decimal {
        self.exchange.to_display(self.current_capital())
    }

    pub fn display_base_capital(&self) -> Decimal {
        self.exchange.to_display(self.bankroll.base_capital())
    }

    /// Make the displayed total equal `input` (display currency) while keeping
    /// realized profit. Bad input is a logged no-op.
    pub async fn edit_displayed_total(&mut self, input: &str) -> bool {
        let Some(requested) = parse_decimal(input) else {
            warn!(account = %self.account_id, input, "Ignoring non-numeric bankroll");
            return false;
        };
        if let Err(e) = validate_bankroll(requested) {
            warn!(account = %self.account_id, "{}", e);
            return false;
        }

        let requested_internal = self.exchange.to_internal(requested);
        let new_base = self.bankroll.rebase_to_total(requested_internal, &self.ledger);

        if !self.is_guest() {
            if let Err(e) = self
                .directory
                .persist_starting_bankroll(&self.account_id, new_base)
                .await
            {
                warn!(account = %self.account_id, error = %e, "Starting bankroll not persisted");
            }
        }
        true
    }

    /// Takes effect for every later conversion; stored values never change
    pub fn set_exchange_rate(&mut self, input: &str) -> bool {
        self.exchange.set_rate_from_input(input)
    }

    pub fn set_display_currency(&mut self, currency: Currency) {
        info!(account = %self.account_id, currency = %currency, "Display currency changed");
        self.exchange.set_display_currency(currency);
    }

    /// Format an internal amount in the display currency
    pub fn format(&self, internal_amount: Decimal) -> String {
        self.exchange.format(internal_amount)
    }

    // =========================================================================
    // Projections
    // =========================================================================

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary::compute(&self.ledger, &self.bankroll)
    }

    /// Performance in display units
    pub fn performance(&self) -> PerformanceReport {
        PerformanceReport::from_ledger(&self.ledger).in_display_units(&self.exchange)
    }

    /// Equity curve in display units, starting from the displayed base capital
    pub fn equity_curve(&self) -> EquityCurve {
        EquityCurve::from_ledger(&self.ledger, self.display_base_capital(), &self.exchange)
    }

    pub fn clv(&self) -> Vec<ClvEntry> {
        clv_entries(self.ledger.records())
    }

    /// Kelly recommendation sized against the displayed bankroll
    pub fn recommend_stake(
        &self,
        calculator: &KellyCalculator,
        decimal_odds: Option<Decimal>,
        win_probability_percent: Option<Decimal>,
    ) -> StakeRecommendation {
        calculator.recommend(&StakeRequest {
            bankroll: Some(self.display_current_capital()),
            decimal_odds,
            win_probability_percent,
        })
    }
}
