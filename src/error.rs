use thiserror::Error;

use crate::domain::{BetId, BetStatus};

/// Main error type for the bankroll engine
#[derive(Error, Debug)]
pub enum BetsmartError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Ledger errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Analysis collaborator errors
    #[error(transparent)]
    Oracle(#[from] OracleError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for BetsmartError
pub type Result<T> = std::result::Result<T, BetsmartError>;

/// Errors raised by ledger mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Bet not found: {id}")]
    NotFound { id: BetId },

    #[error("Invalid transition for bet {id}: from {from} to {to}")]
    InvalidTransition {
        id: BetId,
        from: BetStatus,
        to: BetStatus,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failures reported by the external analysis service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Analysis quota exhausted: {0}")]
    RateLimited(String),

    #[error("Analysis failed: {0}")]
    Generic(String),

    #[error("Analysis request superseded or cancelled")]
    Cancelled,
}

const RATE_LIMIT_MESSAGE: &str = "### ERROR 429: QUOTA EXCEEDED\n\n\
The analysis service usage limit has been reached. Please wait a few minutes before trying again.";

const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed. Please try again.";

impl OracleError {
    /// Classify a raw failure text coming back from the analysis service.
    ///
    /// Quota exhaustion is reported either as an HTTP 429 or as a
    /// `RESOURCE_EXHAUSTED` status; everything else is a generic failure.
    pub fn classify(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.contains("429") || raw.contains("RESOURCE_EXHAUSTED") {
            OracleError::RateLimited(raw)
        } else {
            OracleError::Generic(raw)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, OracleError::RateLimited(_))
    }

    /// Message shown to the user in place of an analysis
    pub fn user_message(&self) -> &'static str {
        match self {
            OracleError::RateLimited(_) => RATE_LIMIT_MESSAGE,
            OracleError::Generic(_) | OracleError::Cancelled => GENERIC_FAILURE_MESSAGE,
        }
    }
}
