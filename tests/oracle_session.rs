use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use betsmart::agent::{
    describe_failure, AnalysisData, AnalysisResult, AnalyzeRequest, Oracle, OracleSession,
    PickItem, TicketImage,
};
use betsmart::ledger::Ledger;
use betsmart::error::OracleError;
use betsmart::strategy::KellyCalculator;
use rust_decimal_macros::dec;

/// Answers after a fixed delay; events containing "quota" fail with a 429.
struct ScriptedOracle {
    delay: Duration,
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn request_analysis(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<AnalysisResult, OracleError> {
        tokio::time::sleep(self.delay).await;
        if request.event.contains("quota") {
            return Err(OracleError::classify("HTTP 429 Too Many Requests"));
        }
        if request.event.contains("offline") {
            return Err(OracleError::classify("connection refused"));
        }
        Ok(AnalysisResult {
            data: AnalysisData::from_json(
                r#"{"verdict":"BUY","userOdds":2.1,"fairWinProb":58,"keyStat":"home form"}"#,
            ),
            analysis: format!("analysis of {}", request.event),
        })
    }

    async fn analyze_ticket(&self, ticket: &TicketImage) -> Result<AnalysisResult, OracleError> {
        tokio::time::sleep(self.delay).await;
        if ticket.data.is_empty() {
            return Err(OracleError::classify("400 empty image"));
        }
        Ok(AnalysisResult {
            data: AnalysisData::from_json(r#"{"verdict":"WARN","ticketSelection":"2-leg parlay"}"#),
            analysis: format!("ticket read from {}", ticket.mime_type),
        })
    }

    async fn daily_picks(&self) -> Result<Vec<PickItem>, OracleError> {
        tokio::time::sleep(self.delay).await;
        Ok(PickItem::list_from_json(
            r#"[
                {"type":"SINGLE","sport":"SOCCER","event":"Arsenal vs Chelsea","market":"Arsenal DNB",
                 "odds":1.9,"winProb":60,"category":"VALUE","strategyName":"Value"},
                {"type":"SINGLE","event":"Placeholder","market":"TBD","odds":0}
            ]"#,
        ))
    }
}

fn session(delay_ms: u64, timeout_ms: u64) -> OracleSession {
    OracleSession::new(
        Arc::new(ScriptedOracle {
            delay: Duration::from_millis(delay_ms),
        }),
        Duration::from_millis(timeout_ms),
    )
}

/// A completed analysis pre-fills a Kelly request.
#[test]
fn analysis_feeds_kelly_prefill() {
    let session = session(1, 1_000);
    let result = tokio_test::block_on(session.analyze(AnalyzeRequest::new("Arsenal vs Chelsea", "Arsenal ML")))
        .unwrap();

    assert_eq!(result.summary(), "home form");
    let data = result.data.unwrap();
    let rec = KellyCalculator::default().recommend(&data.stake_request(dec!(1000)));
    assert!(rec.has_edge());
}

/// Starting a second request turns the first answer stale.
#[tokio::test]
async fn newer_request_supersedes_older() {
    let session = session(50, 1_000);
    let first = session.begin(AnalyzeRequest::new("first", "ML"));
    let second = session.begin(AnalyzeRequest::new("second", "ML"));

    assert!(first.is_stale());
    assert!(!second.is_stale());
    assert_eq!(first.wait().await, Err(OracleError::Cancelled));
    assert_eq!(second.wait().await.unwrap().analysis, "analysis of second");
}

/// Rate limits stay distinguishable from other failures.
#[tokio::test]
async fn rate_limit_has_its_own_message() {
    let session = session(1, 1_000);

    let quota = session
        .analyze(AnalyzeRequest::new("quota test", "ML"))
        .await
        .unwrap_err();
    assert!(quota.is_rate_limited());

    let offline = session
        .analyze(AnalyzeRequest::new("offline test", "ML"))
        .await
        .unwrap_err();
    assert!(!offline.is_rate_limited());
    assert_ne!(describe_failure(&quota), describe_failure(&offline));
}

/// A slow oracle is reported as a generic failure once the timeout passes.
#[tokio::test]
async fn slow_oracle_times_out() {
    let session = session(500, 20);
    let err = session
        .analyze(AnalyzeRequest::new("slow", "ML"))
        .await
        .unwrap_err();
    assert!(matches!(err, OracleError::Generic(_)));
}

/// Ticket photos go through the same session and cancel pending analyses.
#[tokio::test]
async fn ticket_audit_replaces_pending_analysis() {
    let session = session(30, 1_000);
    let analysis = session.begin(AnalyzeRequest::new("first", "ML"));
    let ticket = session.begin(TicketImage::new(vec![1, 2, 3]).with_mime_type("image/jpeg"));

    assert_eq!(analysis.wait().await, Err(OracleError::Cancelled));
    let result = ticket.wait().await.unwrap();
    assert_eq!(result.analysis, "ticket read from image/jpeg");
    assert_eq!(
        result.data.and_then(|d| d.ticket_selection).as_deref(),
        Some("2-leg parlay")
    );

    let err = session.analyze(TicketImage::new(Vec::new())).await.unwrap_err();
    assert!(!err.is_rate_limited());
}

/// Daily picks with usable odds can be put on the slip.
#[tokio::test]
async fn daily_picks_fill_the_bet_slip() {
    let session = session(1, 1_000);
    let picks = session.daily_picks().await.unwrap();
    assert_eq!(picks.len(), 2);

    let mut ledger = Ledger::new();
    for pick in &picks {
        if let Some(bet) = pick.to_new_bet(dec!(10)) {
            ledger.append(bet).unwrap();
        }
    }
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.records()[0].event, "Arsenal vs Chelsea");
    assert_eq!(ledger.records()[0].analysis_summary, "Value");
}
