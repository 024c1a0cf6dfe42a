//! Read-side projections of the ledger
//!
//! Everything here is recomputed on demand from the ledger's current state
//! and never written back.

pub mod clv;
pub mod equity;
pub mod performance;

pub use clv::{clv_edge, clv_entries, clv_summary, ClvEntry, ClvSummary};
pub use equity::{EquityBounds, EquityCurve, EquityPoint};
pub use performance::{LedgerSummary, PerformanceReport, PerformanceStats, SegmentStats};
