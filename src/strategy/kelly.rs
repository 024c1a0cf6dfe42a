//! Fractional Kelly stake sizing
//!
//! ```text
//! b  = odds - 1
//! p  = win% / 100, deflated by 0.95 when the safety margin is on
//! q  = 1 - p
//! f* = (b*p - q) / b
//! stake = f* * profile_multiplier * bankroll     (never below zero)
//! ```
//!
//! Every input is optional and every failure path yields a zero stake: this
//! is a recommendation aid, not a gate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{parse_decimal, round2};

/// Relative haircut applied to the believed win probability.
/// Flat 5% regardless of profile or sample size.
pub const SAFETY_MARGIN_FACTOR: Decimal = dec!(0.95);

/// A stake above this fraction of the bankroll is flagged as high risk
pub const HIGH_RISK_FRACTION: Decimal = dec!(0.05);

/// How much of full Kelly the user is willing to risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl RiskProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Balanced => "balanced",
            RiskProfile::Aggressive => "aggressive",
        }
    }

    /// Fraction of full Kelly actually staked
    pub fn fraction_multiplier(&self) -> Decimal {
        match self {
            RiskProfile::Conservative => dec!(0.25),
            RiskProfile::Balanced => dec!(0.5),
            RiskProfile::Aggressive => Decimal::ONE,
        }
    }

    /// Short label used in tables (LOW / MEDIUM / HIGH)
    pub fn label(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "LOW",
            RiskProfile::Balanced => "MEDIUM",
            RiskProfile::Aggressive => "HIGH",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" | "low" => Ok(RiskProfile::Conservative),
            "balanced" | "medium" => Ok(RiskProfile::Balanced),
            "aggressive" | "high" => Ok(RiskProfile::Aggressive),
            _ => Err(format!("Unknown risk profile: {}", s)),
        }
    }
}

/// Inputs for one stake recommendation. Missing values produce a zero stake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StakeRequest {
    /// Bankroll in whichever unit the stake should come back in
    pub bankroll: Option<Decimal>,
    pub decimal_odds: Option<Decimal>,
    pub win_probability_percent: Option<Decimal>,
}

impl StakeRequest {
    pub fn new(bankroll: Decimal, decimal_odds: Decimal, win_probability_percent: Decimal) -> Self {
        Self {
            bankroll: Some(bankroll),
            decimal_odds: Some(decimal_odds),
            win_probability_percent: Some(win_probability_percent),
        }
    }

    /// Build from raw form fields; anything unparsable becomes `None`
    pub fn from_inputs(bankroll: &str, decimal_odds: &str, win_probability_percent: &str) -> Self {
        Self {
            bankroll: parse_decimal(bankroll),
            decimal_odds: parse_decimal(decimal_odds),
            win_probability_percent: parse_decimal(win_probability_percent),
        }
    }
}

/// Stake recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRecommendation {
    /// Full Kelly fraction after the safety margin (may be negative)
    pub full_kelly_fraction: Decimal,
    /// Fraction of bankroll to stake after the profile multiplier (>= 0)
    pub stake_fraction: Decimal,
    /// Recommended stake, rounded to cents (>= 0)
    pub stake: Decimal,
    /// Stake as percent of bankroll
    pub bankroll_percent: Decimal,
    /// Stake exceeds the high-risk share of the bankroll (warning only)
    pub high_risk: bool,
}

impl StakeRecommendation {
    pub fn zero() -> Self {
        Self {
            full_kelly_fraction: Decimal::ZERO,
            stake_fraction: Decimal::ZERO,
            stake: Decimal::ZERO,
            bankroll_percent: Decimal::ZERO,
            high_risk: false,
        }
    }

    pub fn has_edge(&self) -> bool {
        self.stake > Decimal::ZERO
    }
}

/// Full Kelly fraction `(b*p - q) / b` for decimal odds and a 0-1 probability.
/// Returns zero when the odds carry no payout (`b <= 0`).
pub fn full_kelly_fraction(decimal_odds: Decimal, probability: Decimal) -> Decimal {
    let b = decimal_odds - Decimal::ONE;
    if b <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let q = Decimal::ONE - probability;
    (b * probability - q) / b
}

/// Fractional Kelly calculator bound to a risk profile
#[derive(Debug, Clone)]
pub struct KellyCalculator {
    pub risk_profile: RiskProfile,
    pub use_safety_margin: bool,
    pub high_risk_fraction: Decimal,
}

impl KellyCalculator {
    /// Safety margin on, default high-risk threshold
    pub fn new(risk_profile: RiskProfile) -> Self {
        Self {
            risk_profile,
            use_safety_margin: true,
            high_risk_fraction: HIGH_RISK_FRACTION,
        }
    }

    pub fn with_safety_margin(mut self, enabled: bool) -> Self {
        self.use_safety_margin = enabled;
        self
    }

    pub fn with_high_risk_fraction(mut self, fraction: Decimal) -> Self {
        self.high_risk_fraction = fraction;
        self
    }

    /// Probability actually used in the formula
    pub fn adjusted_probability(&self, win_probability_percent: Decimal) -> Decimal {
        let raw = win_probability_percent / dec!(100);
        if self.use_safety_margin {
            raw * SAFETY_MARGIN_FACTOR
        } else {
            raw
        }
    }

    pub fn recommend(&self, request: &StakeRequest) -> StakeRecommendation {
        match (
            request.bankroll,
            request.decimal_odds,
            request.win_probability_percent,
        ) {
            (Some(bankroll), Some(odds), Some(win_pct)) => self.calculate(bankroll, odds, win_pct),
            _ => StakeRecommendation::zero(),
        }
    }

    pub fn calculate(
        &self,
        bankroll: Decimal,
        decimal_odds: Decimal,
        win_probability_percent: Decimal,
    ) -> StakeRecommendation {
        if bankroll <= Decimal::ZERO
            || decimal_odds <= Decimal::ONE
            || win_probability_percent < Decimal::ZERO
            || win_probability_percent > dec!(100)
        {
            return StakeRecommendation::zero();
        }

        let p = self.adjusted_probability(win_probability_percent);
        let full_kelly = full_kelly_fraction(decimal_odds, p);
        let stake_fraction = full_kelly * self.risk_profile.fraction_multiplier();

        // Never recommend staking against a negative edge
        if stake_fraction <= Decimal::ZERO {
            return StakeRecommendation {
                full_kelly_fraction: full_kelly,
                ..StakeRecommendation::zero()
            };
        }

        let stake = round2(stake_fraction * bankroll);
        StakeRecommendation {
            full_kelly_fraction: full_kelly,
            stake_fraction,
            stake,
            bankroll_percent: round2(stake_fraction * dec!(100)),
            high_risk: stake_fraction > self.high_risk_fraction,
        }
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::new(RiskProfile::default())
    }
}
