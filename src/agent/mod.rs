//! Analysis oracle boundary
//!
//! This module provides:
//! - Request/response types for the external analysis service (event
//!   analysis, bet slip photos, daily picks)
//! - The `Oracle` trait a transport implements
//! - A session wrapper adding timeouts and stale-result cancellation
//!
//! No transport ships with the crate.

pub mod oracle;
pub mod protocol;

pub use oracle::{describe_failure, Oracle, OracleSession, PendingAnalysis};
pub use protocol::{
    on_losing_streak, AnalysisData, AnalysisResult, AnalyzeRequest, OracleRequest, ParlayLeg,
    PickCategory, PickItem, PickKind, TicketImage, Verdict, LOSING_STREAK_LEN,
};
