/// Boundary validation for user-entered numbers
///
/// Every monetary or price input passes through here before it reaches the
/// ledger. A rejected value never mutates state; interactive callers turn the
/// error into a logged no-op.
use crate::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Largest accepted stake, internal currency
pub const MAX_STAKE: Decimal = dec!(1000000000000);

/// Largest accepted decimal price
pub const MAX_ODDS: Decimal = dec!(10000);

/// Largest accepted bankroll total, display currency
pub const MAX_BANKROLL: Decimal = dec!(1000000000000000000);

/// Validate a stake (internal currency, zero allowed)
pub fn validate_stake(stake: Decimal) -> Result<(), LedgerError> {
    if stake < Decimal::ZERO {
        return Err(LedgerError::InvalidInput(format!(
            "stake cannot be negative: {}",
            stake
        )));
    }
    if stake > MAX_STAKE {
        return Err(LedgerError::InvalidInput(format!(
            "stake exceeds {}: {}",
            MAX_STAKE, stake
        )));
    }
    Ok(())
}

/// Validate decimal odds offered for a bet (above 1.0, at most [`MAX_ODDS`])
pub fn validate_odds(odds: Decimal) -> Result<(), LedgerError> {
    if odds <= Decimal::ONE || odds > MAX_ODDS {
        return Err(LedgerError::InvalidInput(format!(
            "odds must be greater than 1.0 and at most {}: {}",
            MAX_ODDS, odds
        )));
    }
    Ok(())
}

/// Validate a closing price; same domain as offered odds
pub fn validate_closing_odds(closing_odds: Decimal) -> Result<(), LedgerError> {
    if closing_odds <= Decimal::ONE || closing_odds > MAX_ODDS {
        return Err(LedgerError::InvalidInput(format!(
            "closing odds must be greater than 1.0 and at most {}: {}",
            MAX_ODDS, closing_odds
        )));
    }
    Ok(())
}

/// Validate a win probability expressed in percent (0-100 inclusive)
pub fn validate_probability_percent(percent: Decimal) -> Result<(), LedgerError> {
    if percent < Decimal::ZERO || percent > dec!(100) {
        return Err(LedgerError::InvalidInput(format!(
            "win probability must be between 0 and 100: {}",
            percent
        )));
    }
    Ok(())
}

/// Validate a requested bankroll total (display currency)
pub fn validate_bankroll(amount: Decimal) -> Result<(), LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidInput(format!(
            "bankroll cannot be negative: {}",
            amount
        )));
    }
    if amount > MAX_BANKROLL {
        return Err(LedgerError::InvalidInput(format!(
            "bankroll exceeds {}: {}",
            MAX_BANKROLL, amount
        )));
    }
    Ok(())
}
