pub mod agent;
pub mod analytics;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod services;
pub mod strategy;
pub mod validation;

pub use agent::{AnalysisResult, AnalyzeRequest, Oracle, OracleSession};
pub use analytics::{ClvSummary, EquityCurve, LedgerSummary, PerformanceReport};
pub use config::AppConfig;
pub use domain::{BetId, BetRecord, BetStatus, Currency, ExchangeContext, NewBet};
pub use error::{BetsmartError, LedgerError, OracleError, Result};
pub use ledger::{BankrollState, Ledger};
pub use persistence::{AccountDirectory, JsonFileDirectory, JsonFileLedgerStore, LedgerStore};
pub use services::{AccountSession, SessionDefaults};
pub use strategy::{KellyCalculator, RiskProfile, StakeRecommendation};
