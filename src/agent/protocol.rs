//! Analysis request/response shapes exchanged with the oracle
//!
//! The oracle's payload varies from call to call, so every field of
//! [`AnalysisData`] and [`PickItem`] is optional and consumers must cope with
//! any subset. Fields are decoded one at a time: a mistyped field is dropped
//! on its own and the rest of the payload is kept.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{BetStatus, NewBet, Segment};
use crate::ledger::Ledger;
use crate::strategy::StakeRequest;

/// Consecutive most-recent losses that mark a losing streak
pub const LOSING_STREAK_LEN: usize = 3;

/// What the user wants analysed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub event: String,
    pub market: String,
    pub odds: Option<Decimal>,
    pub sport: Option<Segment>,
    /// Asks the oracle to be more conservative
    pub losing_streak: bool,
}

impl AnalyzeRequest {
    pub fn new(event: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            market: market.into(),
            odds: None,
            sport: None,
            losing_streak: false,
        }
    }

    pub fn with_odds(mut self, odds: Decimal) -> Self {
        self.odds = Some(odds);
        self
    }

    pub fn with_sport(mut self, sport: impl Into<Segment>) -> Self {
        self.sport = Some(sport.into());
        self
    }

    /// Flag a losing streak when the latest settled bets were all lost
    pub fn with_ledger_context(mut self, ledger: &Ledger) -> Self {
        self.losing_streak = on_losing_streak(ledger);
        self
    }
}

/// True when the last [`LOSING_STREAK_LEN`] settled bets (by id) were all lost
pub fn on_losing_streak(ledger: &Ledger) -> bool {
    let recent: Vec<BetStatus> = ledger
        .chronological()
        .into_iter()
        .rev()
        .filter(|r| r.is_settled())
        .take(LOSING_STREAK_LEN)
        .map(|r| r.status)
        .collect();
    recent.len() == LOSING_STREAK_LEN && recent.iter().all(|s| *s == BetStatus::Lost)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Pass,
    Warn,
    #[serde(other)]
    Unknown,
}

/// Decode `key` on its own; null, missing and mistyped all read as `None`
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    match map.get(key)? {
        Value::Null => None,
        value => match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(field = key, error = %e, "Dropping mistyped payload field");
                None
            }
        },
    }
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!("Discarding non-object payload");
            None
        }
        Err(e) => {
            debug!(error = %e, "Discarding malformed payload");
            None
        }
    }
}

/// Structured part of an analysis. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub verdict: Option<Verdict>,
    pub user_odds: Option<Decimal>,
    /// Fair win probability in percent
    pub fair_win_prob: Option<Decimal>,
    pub confidence_interval_low: Option<Decimal>,
    pub confidence_interval_high: Option<Decimal>,
    pub pinnacle_odds: Option<Decimal>,
    pub opposing_odds: Option<Decimal>,
    pub ev_percentage: Option<Decimal>,
    pub confidence_score: Option<Decimal>,
    pub recommended_stake_unit: Option<Decimal>,
    pub kelly_suggested: Option<Decimal>,
    pub key_stat: Option<String>,
    pub ticket_selection: Option<String>,
    pub optimistic_scenario: Option<String>,
    pub pessimistic_scenario: Option<String>,
    pub sources: Option<Vec<String>>,
    pub detected_sport: Option<Segment>,
}

impl AnalysisData {
    /// Parse a JSON object; `None` only when the text is not an object
    pub fn from_json(raw: &str) -> Option<Self> {
        parse_object(raw).map(|map| Self::from_map(&map))
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            verdict: field(map, "verdict"),
            user_odds: field(map, "userOdds"),
            fair_win_prob: field(map, "fairWinProb"),
            confidence_interval_low: field(map, "confidenceIntervalLow"),
            confidence_interval_high: field(map, "confidenceIntervalHigh"),
            pinnacle_odds: field(map, "pinnacleOdds"),
            opposing_odds: field(map, "opposingOdds"),
            ev_percentage: field(map, "evPercentage"),
            confidence_score: field(map, "confidenceScore"),
            recommended_stake_unit: field(map, "recommendedStakeUnit"),
            kelly_suggested: field(map, "kellySuggested"),
            key_stat: field(map, "keyStat"),
            ticket_selection: field(map, "ticketSelection"),
            optimistic_scenario: field(map, "optimisticScenario"),
            pessimistic_scenario: field(map, "pessimisticScenario"),
            sources: field(map, "sources"),
            detected_sport: field(map, "detectedSport"),
        }
    }

    /// Odds and win probability (percent) usable to pre-fill a Kelly
    /// request. Zero or out-of-domain values count as absent.
    pub fn kelly_prefill(&self) -> (Option<Decimal>, Option<Decimal>) {
        let odds = self.user_odds.filter(|o| *o > Decimal::ONE);
        let win_pct = self
            .fair_win_prob
            .filter(|p| *p > Decimal::ZERO && *p <= Decimal::ONE_HUNDRED);
        (odds, win_pct)
    }

    pub fn stake_request(&self, bankroll: Decimal) -> StakeRequest {
        let (decimal_odds, win_probability_percent) = self.kelly_prefill();
        StakeRequest {
            bankroll: Some(bankroll),
            decimal_odds,
            win_probability_percent,
        }
    }
}

impl<'de> Deserialize<'de> for AnalysisData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(&map))
    }
}

fn lenient_data<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AnalysisData>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_object).map(AnalysisData::from_map))
}

/// Oracle answer: optional structured data plus free-form text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_data")]
    pub data: Option<AnalysisData>,
    #[serde(default)]
    pub analysis: String,
}

impl AnalysisResult {
    pub fn text_only(analysis: impl Into<String>) -> Self {
        Self {
            data: None,
            analysis: analysis.into(),
        }
    }

    /// Summary stored on a bet recorded from this analysis
    pub fn summary(&self) -> String {
        self.data
            .as_ref()
            .and_then(|d| d.key_stat.clone())
            .unwrap_or_else(|| "Auto".to_string())
    }
}

/// Photo of a bet slip to transcribe and audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl TicketImage {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            data,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Anything that produces an [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq)]
pub enum OracleRequest {
    Analyze(AnalyzeRequest),
    Ticket(TicketImage),
}

impl From<AnalyzeRequest> for OracleRequest {
    fn from(request: AnalyzeRequest) -> Self {
        OracleRequest::Analyze(request)
    }
}

impl From<TicketImage> for OracleRequest {
    fn from(ticket: TicketImage) -> Self {
        OracleRequest::Ticket(ticket)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PickKind {
    #[default]
    Single,
    Parlay,
    System,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickCategory {
    Banker,
    Value,
    HighYield,
    #[serde(other)]
    Unknown,
}

/// One selection of a parlay pick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlayLeg {
    pub event: String,
    pub market: String,
    pub selection: String,
    pub odds: Option<Decimal>,
}

impl ParlayLeg {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            event: field(map, "event").unwrap_or_default(),
            market: field(map, "market").unwrap_or_default(),
            selection: field(map, "selection").unwrap_or_default(),
            odds: field(map, "odds"),
        }
    }
}

/// A suggested bet from the daily scan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickItem {
    #[serde(rename = "type")]
    pub kind: PickKind,
    pub strategy_name: Option<String>,
    pub sport: Option<Segment>,
    pub event: String,
    pub market: String,
    pub start_time: Option<DateTime<Utc>>,
    pub rationale: Option<String>,
    pub algorithm_log: Option<String>,
    pub confidence: Option<Decimal>,
    pub category: Option<PickCategory>,
    /// Win probability in percent
    pub win_prob: Option<Decimal>,
    pub betting_method: Option<String>,
    pub probability_rationale: Option<String>,
    /// Total decimal odds
    pub odds: Option<Decimal>,
    pub fair_odds: Option<Decimal>,
    pub edge: Option<Decimal>,
    pub legs: Vec<ParlayLeg>,
}

impl PickItem {
    /// `None` when the entry names no event
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let event: String = field(map, "event")?;
        if event.trim().is_empty() {
            return None;
        }
        let legs = field::<Vec<Value>>(map, "legs")
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_object)
            .map(ParlayLeg::from_map)
            .collect();

        Some(Self {
            kind: field(map, "type").unwrap_or_default(),
            strategy_name: field(map, "strategyName"),
            sport: field(map, "sport"),
            event,
            market: field(map, "market").unwrap_or_default(),
            start_time: field(map, "startTime"),
            rationale: field(map, "rationale"),
            algorithm_log: field(map, "algorithmLog"),
            confidence: field(map, "confidence"),
            category: field(map, "category"),
            win_prob: field(map, "winProb"),
            betting_method: field(map, "bettingMethod"),
            probability_rationale: field(map, "probabilityRationale"),
            odds: field(map, "odds"),
            fair_odds: field(map, "fairOdds"),
            edge: field(map, "edge"),
            legs,
        })
    }

    /// Parse a JSON array of picks, skipping entries that are not usable
    pub fn list_from_json(raw: &str) -> Vec<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(Self::from_map)
                .collect(),
            Ok(_) => {
                debug!("Discarding non-array picks payload");
                Vec::new()
            }
            Err(e) => {
                debug!(error = %e, "Discarding malformed picks payload");
                Vec::new()
            }
        }
    }

    /// Odds and win probability (percent) for a Kelly request
    pub fn kelly_prefill(&self) -> (Option<Decimal>, Option<Decimal>) {
        let odds = self.odds.filter(|o| *o > Decimal::ONE);
        let win_pct = self
            .win_prob
            .filter(|p| *p > Decimal::ZERO && *p <= Decimal::ONE_HUNDRED);
        (odds, win_pct)
    }

    /// Bet slip entry for this pick at `stake`; `None` without usable odds
    pub fn to_new_bet(&self, stake: Decimal) -> Option<NewBet> {
        let (odds, _) = self.kelly_prefill();
        let mut bet = NewBet::new(self.event.clone(), self.market.clone(), stake, odds?);
        if let Some(sport) = &self.sport {
            bet = bet.with_segment(sport.clone());
        }
        if let Some(summary) = self.strategy_name.as_ref().or(self.rationale.as_ref()) {
            bet = bet.with_summary(summary.clone());
        }
        Some(bet)
    }
}

impl<'de> Deserialize<'de> for PickItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(&map).ok_or_else(|| serde::de::Error::missing_field("event"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBet;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_payload() {
        let data = AnalysisData::from_json(
            r#"{"verdict":"BUY","userOdds":2.1,"fairWinProb":58,"detectedSport":"NBA","unknownField":true}"#,
        )
        .unwrap();
        assert_eq!(data.verdict, Some(Verdict::Buy));
        assert_eq!(data.detected_sport, Some(Segment::Nba));
        assert_eq!(data.ev_percentage, None);
        assert_eq!(data.kelly_prefill(), (Some(dec!(2.1)), Some(dec!(58))));

        let empty = AnalysisData::from_json("{}").unwrap();
        assert_eq!(empty, AnalysisData::default());
        assert_eq!(empty.kelly_prefill(), (None, None));

        assert!(AnalysisData::from_json("not json").is_none());
    }

    #[test]
    fn test_mistyped_field_keeps_the_rest() {
        let data = AnalysisData::from_json(
            r#"{"verdict":"BUY","userOdds":2.1,"fairWinProb":58,"confidenceScore":"8/10"}"#,
        )
        .unwrap();
        assert_eq!(data.verdict, Some(Verdict::Buy));
        assert_eq!(data.confidence_score, None);
        assert_eq!(data.kelly_prefill(), (Some(dec!(2.1)), Some(dec!(58))));

        let data = AnalysisData::from_json(r#"{"sources":"Pinnacle","keyStat":null,"userOdds":"1.85"}"#)
            .unwrap();
        assert_eq!(data.sources, None);
        assert_eq!(data.key_stat, None);
        assert_eq!(data.user_odds, Some(dec!(1.85)));

        assert!(AnalysisData::from_json("[1, 2]").is_none());
    }

    #[test]
    fn test_result_keeps_text_when_data_is_not_an_object() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"data":"n/a","analysis":"Lean under"}"#).unwrap();
        assert_eq!(result.data, None);
        assert_eq!(result.analysis, "Lean under");

        let result: AnalysisResult =
            serde_json::from_str(r#"{"data":{"fairWinProb":"high","keyStat":"xG"},"analysis":""}"#)
                .unwrap();
        assert_eq!(result.summary(), "xG");
    }

    #[test]
    fn test_unknown_verdict_tolerated() {
        let data = AnalysisData::from_json(r#"{"verdict":"MAYBE"}"#).unwrap();
        assert_eq!(data.verdict, Some(Verdict::Unknown));
    }

    #[test]
    fn test_zero_placeholders_do_not_prefill() {
        let data = AnalysisData {
            user_odds: Some(dec!(0)),
            fair_win_prob: Some(dec!(0)),
            ..Default::default()
        };
        let request = data.stake_request(dec!(1000));
        assert_eq!(request.bankroll, Some(dec!(1000)));
        assert_eq!(request.decimal_odds, None);
        assert_eq!(request.win_probability_percent, None);
    }

    fn add(ledger: &mut Ledger, status: BetStatus) {
        let id = ledger
            .append(NewBet::new("a", "b", dec!(10), dec!(2)))
            .unwrap();
        match status {
            BetStatus::Won | BetStatus::Lost => ledger.resolve(id, status).unwrap(),
            BetStatus::Void => ledger.void(id).unwrap(),
            BetStatus::Pending => {}
        }
    }

    #[test]
    fn test_losing_streak_detection() {
        let mut ledger = Ledger::new();
        add(&mut ledger, BetStatus::Won);
        add(&mut ledger, BetStatus::Lost);
        add(&mut ledger, BetStatus::Lost);
        add(&mut ledger, BetStatus::Void);
        add(&mut ledger, BetStatus::Pending);
        assert!(!on_losing_streak(&ledger));

        add(&mut ledger, BetStatus::Lost);
        let request = AnalyzeRequest::new("A vs B", "ML").with_ledger_context(&ledger);
        assert!(request.losing_streak);
    }

    #[test]
    fn test_summary_falls_back_to_auto() {
        assert_eq!(AnalysisResult::text_only("...").summary(), "Auto");
        let result = AnalysisResult {
            data: Some(AnalysisData {
                key_stat: Some("xG 2.1 vs 0.8".to_string()),
                ..Default::default()
            }),
            analysis: String::new(),
        };
        assert_eq!(result.summary(), "xG 2.1 vs 0.8");
    }

    #[test]
    fn test_picks_parse_leniently() {
        let picks = PickItem::list_from_json(
            r#"[
                {"type":"SINGLE","sport":"NBA","event":"Lakers vs Celtics","market":"Lakers ML",
                 "startTime":"2024-05-21T19:00:00Z","confidence":"9/10","category":"BANKER",
                 "winProb":65,"odds":1.75,"fairOdds":1.54,"edge":13.5,"strategyName":"Banker"},
                {"type":"PARLAY","event":"Doblete","category":"SOMETHING","odds":3.2,
                 "legs":[{"event":"A vs B","market":"ML","selection":"A","odds":1.8}, "junk"]},
                {"market":"no event"},
                42
            ]"#,
        );
        assert_eq!(picks.len(), 2);

        let single = &picks[0];
        assert_eq!(single.kind, PickKind::Single);
        assert_eq!(single.sport, Some(Segment::Nba));
        assert_eq!(single.confidence, None);
        assert_eq!(single.category, Some(PickCategory::Banker));
        assert_eq!(
            single.start_time.map(|t| t.to_rfc3339()),
            Some("2024-05-21T19:00:00+00:00".to_string())
        );
        assert_eq!(single.kelly_prefill(), (Some(dec!(1.75)), Some(dec!(65))));

        let parlay = &picks[1];
        assert_eq!(parlay.kind, PickKind::Parlay);
        assert_eq!(parlay.category, Some(PickCategory::Unknown));
        assert_eq!(parlay.legs.len(), 1);
        assert_eq!(parlay.legs[0].selection, "A");

        assert!(PickItem::list_from_json("{}").is_empty());
    }

    #[test]
    fn test_pick_becomes_bet_slip_entry() {
        let pick = PickItem {
            event: "Arsenal vs Chelsea".to_string(),
            market: "Arsenal DNB".to_string(),
            sport: Some(Segment::Soccer),
            strategy_name: Some("Value Ladder".to_string()),
            odds: Some(dec!(1.9)),
            ..Default::default()
        };
        let bet = pick.to_new_bet(dec!(0)).unwrap();
        assert_eq!(bet.pick, "Arsenal DNB");
        assert_eq!(bet.odds, dec!(1.9));
        assert_eq!(bet.segment, Some(Segment::Soccer));
        assert_eq!(bet.analysis_summary.as_deref(), Some("Value Ladder"));

        let no_price = PickItem {
            odds: Some(dec!(1)),
            ..pick
        };
        assert!(no_price.to_new_bet(dec!(0)).is_none());
    }
}
