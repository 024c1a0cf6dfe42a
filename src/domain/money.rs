use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::LedgerError;

/// Round a monetary amount to cents, half away from zero.
///
/// Applied after every arithmetic combination so drift never accumulates
/// across many additions or conversions.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest accepted display units per internal unit
pub const MAX_EXCHANGE_RATE: Decimal = dec!(1000000);

/// `a / b` clamped to the representable range instead of panicking
pub fn saturating_div(a: Decimal, b: Decimal) -> Decimal {
    a.checked_div(b).unwrap_or(if a.is_sign_negative() == b.is_sign_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

/// Parse a user-typed number leniently (trims, accepts a `,` decimal mark).
pub fn parse_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_str(&trimmed.replace(',', ".")))
        .ok()
}

/// Currencies the user can view amounts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Internal accounting unit
    #[default]
    Usd,
    /// Colombian peso
    Cop,
}

impl Currency {
    /// The single currency every stored amount is denominated in
    pub const INTERNAL: Currency = Currency::Usd;

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cop => "COP",
        }
    }

    pub fn is_internal(&self) -> bool {
        *self == Self::INTERNAL
    }

    /// Render an amount already expressed in this currency.
    ///
    /// USD: `$1,234.56` (always two decimals). COP: `$ 37.000` with `.` grouping,
    /// `,` decimal mark and cents only when non-zero.
    pub fn format(&self, amount: Decimal) -> String {
        let amount = round2(amount);
        let sign = if amount.is_sign_negative() && !amount.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = amount.abs();
        let whole = abs.trunc();
        let cents = ((abs - whole) * dec!(100)).trunc().to_u32().unwrap_or(0);

        match self {
            Currency::Usd => format!(
                "{sign}${}.{:02}",
                group_thousands(&whole.to_string(), ','),
                cents
            ),
            Currency::Cop => {
                let grouped = group_thousands(&whole.to_string(), '.');
                if cents == 0 {
                    format!("{sign}$ {grouped}")
                } else {
                    format!("{sign}$ {grouped},{:02}", cents)
                }
            }
        }
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "COP" => Ok(Currency::Cop),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

/// Conversion between the internal accounting currency and the display currency.
///
/// `rate` is display units per one internal unit. It only applies while the
/// display currency differs from the internal one; otherwise conversion is
/// the identity (still rounded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeContext {
    display: Currency,
    rate: Decimal,
}

impl ExchangeContext {
    pub fn new(display: Currency, rate: Decimal) -> Result<Self, LedgerError> {
        validate_rate(rate)?;
        Ok(Self { display, rate })
    }

    /// Identity context: display in the internal currency
    pub fn internal() -> Self {
        Self {
            display: Currency::INTERNAL,
            rate: Decimal::ONE,
        }
    }

    pub fn display_currency(&self) -> Currency {
        self.display
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Multiplier actually applied when converting internal -> display
    pub fn unit_factor(&self) -> Decimal {
        if self.display.is_internal() {
            Decimal::ONE
        } else {
            self.rate
        }
    }

    pub fn set_display_currency(&mut self, currency: Currency) {
        self.display = currency;
    }

    /// Replace the rate. A non-positive rate is rejected and the previous one kept.
    pub fn set_rate(&mut self, rate: Decimal) -> Result<(), LedgerError> {
        validate_rate(rate)?;
        debug!(old = %self.rate, new = %rate, "exchange rate updated");
        self.rate = rate;
        Ok(())
    }

    /// Interactive variant of [`set_rate`](Self::set_rate): bad input is a logged no-op.
    pub fn set_rate_from_input(&mut self, input: &str) -> bool {
        match parse_decimal(input) {
            Some(rate) => match self.set_rate(rate) {
                Ok(()) => true,
                Err(e) => {
                    warn!(input, "{}", e);
                    false
                }
            },
            None => {
                warn!(input, "ignoring non-numeric exchange rate");
                false
            }
        }
    }

    pub fn to_display(&self, internal_amount: Decimal) -> Decimal {
        round2(internal_amount.saturating_mul(self.unit_factor()))
    }

    pub fn to_internal(&self, display_amount: Decimal) -> Decimal {
        // unit_factor is always positive, see validate_rate
        round2(saturating_div(display_amount, self.unit_factor()))
    }

    /// Convert and render an internal amount in the display currency
    pub fn format(&self, internal_amount: Decimal) -> String {
        self.display.format(self.to_display(internal_amount))
    }
}

impl Default for ExchangeContext {
    fn default() -> Self {
        Self::internal()
    }
}

fn validate_rate(rate: Decimal) -> Result<(), LedgerError> {
    if rate <= Decimal::ZERO {
        return Err(LedgerError::InvalidInput(format!(
            "exchange rate must be positive, got {}",
            rate
        )));
    }
    if rate > MAX_EXCHANGE_RATE {
        return Err(LedgerError::InvalidInput(format!(
            "exchange rate exceeds {}, got {}",
            MAX_EXCHANGE_RATE, rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
        assert_eq!(round2(dec!(999.999999)), dec!(1000.00));
    }

    #[test]
    fn test_round2_idempotent() {
        for raw in [dec!(0.125), dec!(-7.555), dec!(1234.56789), dec!(0), dec!(3.1)] {
            assert_eq!(round2(round2(raw)), round2(raw));
        }
    }

    #[test]
    fn test_cop_conversion_round_trip() {
        let ctx = ExchangeContext::new(Currency::Cop, dec!(3700)).unwrap();
        assert_eq!(ctx.to_display(dec!(10)), dec!(37000.00));
        assert_eq!(ctx.to_internal(dec!(37000)), dec!(10.00));
    }

    #[test]
    fn test_rate_ignored_for_internal_display() {
        let ctx = ExchangeContext::new(Currency::Usd, dec!(3700)).unwrap();
        assert_eq!(ctx.to_display(dec!(10.456)), dec!(10.46));
        assert_eq!(ctx.to_internal(dec!(10)), dec!(10));
    }

    #[test]
    fn test_invalid_rate_keeps_previous() {
        let mut ctx = ExchangeContext::new(Currency::Cop, dec!(3734.50)).unwrap();
        assert!(ctx.set_rate(dec!(0)).is_err());
        assert!(ctx.set_rate(dec!(-5)).is_err());
        assert!(!ctx.set_rate_from_input("abc"));
        assert!(!ctx.set_rate_from_input(""));
        assert_eq!(ctx.rate(), dec!(3734.50));

        assert!(ctx.set_rate_from_input("4000,5"));
        assert_eq!(ctx.rate(), dec!(4000.5));
    }

    #[test]
    fn test_format() {
        assert_eq!(Currency::Usd.format(dec!(1234.5)), "$1,234.50");
        assert_eq!(Currency::Usd.format(dec!(-50)), "-$50.00");
        assert_eq!(Currency::Cop.format(dec!(37000)), "$ 37.000");
        assert_eq!(Currency::Cop.format(dec!(3734500.25)), "$ 3.734.500,25");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("cop".parse::<Currency>().unwrap(), Currency::Cop);
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_extreme_amounts_do_not_panic() {
        let cop = ExchangeContext::new(Currency::Cop, dec!(0.0000001)).unwrap();
        assert_eq!(cop.to_internal(Decimal::MAX), Decimal::MAX);
        assert_eq!(cop.to_internal(Decimal::MIN), Decimal::MIN);

        let cop = ExchangeContext::new(Currency::Cop, MAX_EXCHANGE_RATE).unwrap();
        assert_eq!(cop.to_display(Decimal::MAX), Decimal::MAX);
        assert!(ExchangeContext::new(Currency::Cop, dec!(1000001)).is_err());

        assert_eq!(saturating_div(dec!(10), dec!(4)), dec!(2.5));
    }
}
