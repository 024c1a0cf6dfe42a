//! External analysis collaborator and its cancellable session wrapper
//!
//! Each request started through [`OracleSession::begin`] carries a
//! generation number. Starting a newer request or calling
//! [`OracleSession::cancel`] makes older generations stale; a stale answer is
//! dropped as [`OracleError::Cancelled`] instead of being applied.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::protocol::{AnalysisResult, AnalyzeRequest, OracleRequest, PickItem, TicketImage};
use crate::error::OracleError;

/// Black-box analysis service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn request_analysis(&self, request: &AnalyzeRequest)
        -> Result<AnalysisResult, OracleError>;

    /// Transcribe a bet slip photo and audit each selection
    async fn analyze_ticket(&self, ticket: &TicketImage) -> Result<AnalysisResult, OracleError>;

    /// Value picks for the coming days
    async fn daily_picks(&self) -> Result<Vec<PickItem>, OracleError>;
}

/// User-facing text for a failed analysis
pub fn describe_failure(error: &OracleError) -> &'static str {
    error.user_message()
}

/// Runs oracle requests off the caller's path so the ledger stays usable
pub struct OracleSession {
    oracle: Arc<dyn Oracle>,
    timeout: Duration,
    latest: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl OracleSession {
    pub fn new(oracle: Arc<dyn Oracle>, timeout: Duration) -> Self {
        Self {
            oracle,
            timeout,
            latest: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generation of the most recently started request (0 before any)
    pub fn current_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Start a request, superseding any earlier one still in flight
    pub fn begin(&self, request: impl Into<OracleRequest>) -> PendingAnalysis {
        let request = request.into();
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let oracle = Arc::clone(&self.oracle);
        let limit = self.timeout;

        match &request {
            OracleRequest::Analyze(r) => info!(
                generation,
                event = %r.event,
                market = %r.market,
                losing_streak = r.losing_streak,
                "Requesting analysis"
            ),
            OracleRequest::Ticket(t) => info!(
                generation,
                mime_type = %t.mime_type,
                bytes = t.data.len(),
                "Requesting ticket audit"
            ),
        }

        let handle: JoinHandle<Result<AnalysisResult, OracleError>> = tokio::spawn(async move {
            let call = async {
                match &request {
                    OracleRequest::Analyze(r) => oracle.request_analysis(r).await,
                    OracleRequest::Ticket(t) => oracle.analyze_ticket(t).await,
                }
            };
            match timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(timed_out(limit)),
            }
        });

        if let Ok(mut slot) = self.in_flight.lock() {
            if let Some(previous) = slot.replace(handle.abort_handle()) {
                previous.abort();
            }
        }

        PendingAnalysis {
            generation,
            latest: Arc::clone(&self.latest),
            handle,
        }
    }

    /// Invalidate and abort whatever request is outstanding
    pub fn cancel(&self) {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut slot) = self.in_flight.lock() {
            if let Some(previous) = slot.take() {
                previous.abort();
            }
        }
        debug!(generation, "Analysis cancelled");
    }

    /// Start a request and wait for it
    pub async fn analyze(
        &self,
        request: impl Into<OracleRequest>,
    ) -> Result<AnalysisResult, OracleError> {
        self.begin(request).wait().await
    }

    /// Fetch the daily picks. Independent of the analysis generations.
    pub async fn daily_picks(&self) -> Result<Vec<PickItem>, OracleError> {
        info!("Requesting daily picks");
        let outcome = match timeout(self.timeout, self.oracle.daily_picks()).await {
            Ok(result) => result,
            Err(_) => Err(timed_out(self.timeout)),
        };
        match &outcome {
            Ok(picks) => info!(count = picks.len(), "Daily picks received"),
            Err(e) if e.is_rate_limited() => warn!("Daily picks quota exhausted"),
            Err(e) => warn!(error = %e, "Daily picks failed"),
        }
        outcome
    }
}

fn timed_out(limit: Duration) -> OracleError {
    OracleError::Generic(format!("analysis timed out after {}s", limit.as_secs()))
}

/// Handle to an outstanding analysis
#[derive(Debug)]
pub struct PendingAnalysis {
    generation: u64,
    latest: Arc<AtomicU64>,
    handle: JoinHandle<Result<AnalysisResult, OracleError>>,
}

impl PendingAnalysis {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Superseded by a newer request or a cancel
    pub fn is_stale(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }

    pub async fn wait(self) -> Result<AnalysisResult, OracleError> {
        let generation = self.generation;
        let joined = self.handle.await;

        if self.latest.load(Ordering::SeqCst) != generation {
            debug!(generation, "Dropping stale analysis result");
            return Err(OracleError::Cancelled);
        }

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(OracleError::Cancelled),
            Err(e) => Err(OracleError::Generic(e.to_string())),
        };

        match &outcome {
            Ok(_) => info!(generation, "Analysis received"),
            Err(e) if e.is_rate_limited() => warn!(generation, "Analysis quota exhausted"),
            Err(e) => warn!(generation, error = %e, "Analysis failed"),
        }
        outcome
    }
}
