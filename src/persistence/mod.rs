//! Storage collaborators
//!
//! The engine only talks to these traits; file-backed JSON implementations
//! ship for the CLI and in-memory ones for tests and guest sessions.

pub mod directory;
pub mod ledger_store;

pub use directory::{AccountDirectory, AccountProfile, JsonFileDirectory, MemoryDirectory};
pub use ledger_store::{JsonFileLedgerStore, LedgerStore, MemoryLedgerStore};
