use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::round2;
use crate::analytics::clv::clv_edge;

/// Ledger identifier. Strictly increasing in creation order and the only
/// sort key used for chronological replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BetId(pub u64);

// Older exports stored the id as a millisecond timestamp string
impl<'de> Deserialize<'de> for BetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(BetId(n)),
            RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl BetId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(BetId)
            .map_err(|_| format!("Invalid bet id: {}", s))
    }
}

/// Bet lifecycle: `Pending` moves exactly once to a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    #[default]
    Pending,
    Won,
    Lost,
    Void,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
            BetStatus::Void => "void",
        }
    }

    /// Won or lost: counts towards profit, ROI and win rate
    pub fn is_settled(&self) -> bool {
        matches!(self, BetStatus::Won | BetStatus::Lost)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BetStatus::Pending)
    }

    /// Resolution is one-shot; there is no way back to pending
    pub fn can_transition_to(&self, target: BetStatus) -> bool {
        matches!(
            (self, target),
            (BetStatus::Pending, BetStatus::Won)
                | (BetStatus::Pending, BetStatus::Lost)
                | (BetStatus::Pending, BetStatus::Void)
        )
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BetStatus::Pending),
            "won" | "win" => Ok(BetStatus::Won),
            "lost" | "loss" => Ok(BetStatus::Lost),
            "void" => Ok(BetStatus::Void),
            _ => Err(format!("Unknown bet status: {}", s)),
        }
    }
}

/// Category tag used to bucket records in analytics (usually the sport)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Segment {
    Soccer,
    Nba,
    Tennis,
    Mlb,
    Other,
    Custom(String),
}

impl Segment {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Soccer => "SOCCER",
            Segment::Nba => "NBA",
            Segment::Tennis => "TENNIS",
            Segment::Mlb => "MLB",
            Segment::Other => "OTHER",
            Segment::Custom(tag) => tag,
        }
    }
}

impl From<String> for Segment {
    fn from(tag: String) -> Self {
        match tag.trim().to_uppercase().as_str() {
            "SOCCER" | "FOOTBALL" => Segment::Soccer,
            "NBA" => Segment::Nba,
            "TENNIS" => Segment::Tennis,
            "MLB" => Segment::Mlb,
            "OTHER" | "" => Segment::Other,
            custom => Segment::Custom(custom.to_string()),
        }
    }
}

impl From<&str> for Segment {
    fn from(tag: &str) -> Self {
        Segment::from(tag.to_string())
    }
}

impl From<Segment> for String {
    fn from(segment: Segment) -> Self {
        segment.as_str().to_string()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One wager in the ledger. Amounts are in the internal currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRecord {
    pub id: BetId,
    /// Display date captured at creation; never used for ordering
    pub date: String,
    pub event: String,
    pub pick: String,
    pub stake: Decimal,
    pub odds: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_odds: Option<Decimal>,
    #[serde(default, alias = "sport", skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
    pub status: BetStatus,
    #[serde(default)]
    pub analysis_summary: String,
}

impl BetRecord {
    /// Profit this record contributes to the bankroll. Saturates instead of
    /// overflowing for amounts that bypassed validation.
    pub fn profit(&self) -> Decimal {
        match self.status {
            BetStatus::Won => round2(self.stake.saturating_mul(self.odds.saturating_sub(Decimal::ONE))),
            BetStatus::Lost => -self.stake,
            BetStatus::Pending | BetStatus::Void => Decimal::ZERO,
        }
    }

    /// Gross amount paid back (stake included); zero unless won
    pub fn returned(&self) -> Decimal {
        match self.status {
            BetStatus::Won => round2(self.stake.saturating_mul(self.odds)),
            _ => Decimal::ZERO,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    /// Segment used for aggregation, `OTHER` when untagged
    pub fn segment_or_other(&self) -> Segment {
        self.segment.clone().unwrap_or(Segment::Other)
    }

    /// Closing-line value in percent, when a closing price is recorded
    pub fn clv_edge(&self) -> Option<Decimal> {
        self.closing_odds
            .and_then(|closing| clv_edge(self.odds, closing))
    }
}

/// Input for appending a wager to the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct NewBet {
    pub event: String,
    pub pick: String,
    pub stake: Decimal,
    pub odds: Decimal,
    pub segment: Option<Segment>,
    pub date: Option<String>,
    pub analysis_summary: Option<String>,
}

impl NewBet {
    pub fn new(
        event: impl Into<String>,
        pick: impl Into<String>,
        stake: Decimal,
        odds: Decimal,
    ) -> Self {
        Self {
            event: event.into(),
            pick: pick.into(),
            stake,
            odds,
            segment: None,
            date: None,
            analysis_summary: None,
        }
    }

    pub fn with_segment(mut self, segment: impl Into<Segment>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.analysis_summary = Some(summary.into());
        self
    }
}
