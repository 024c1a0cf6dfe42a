//! Ledger of bet records and the bankroll derived from it
//!
//! - `Ledger`: insertion-ordered records with one-shot resolution
//! - `BankrollState`: base capital; current capital is always derived
//! - `BetIdGenerator`: monotonic ids used as the chronological sort key

pub mod bankroll;
pub mod book;
pub mod id;

pub use bankroll::BankrollState;
pub use book::Ledger;
pub use id::BetIdGenerator;
