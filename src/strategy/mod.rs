//! Staking strategy
//!
//! Stake sizing is read-only with respect to the ledger: it consumes the
//! live bankroll and the user's estimate and returns a recommendation
//! before any bet is recorded.

pub mod kelly;

pub use kelly::{
    full_kelly_fraction, KellyCalculator, RiskProfile, StakeRecommendation, StakeRequest,
    HIGH_RISK_FRACTION, SAFETY_MARGIN_FACTOR,
};
