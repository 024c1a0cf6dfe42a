//! Rendering for `betsmart` command results
//!
//! Rows render as a table, single records as aligned `label  value` lines,
//! and both as pretty JSON under `--json`. Money is always shown in the
//! session's display currency.

use rust_decimal::Decimal;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analytics::{ClvEntry, EquityPoint, SegmentStats};
use crate::domain::{round2, BetRecord, Currency, ExchangeContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

pub fn render_rows<T: Tabled + Serialize>(
    rows: &[T],
    mode: OutputMode,
    empty: &str,
) -> anyhow::Result<String> {
    Ok(match mode {
        OutputMode::Json => serde_json::to_string_pretty(rows)?,
        OutputMode::Table if rows.is_empty() => empty.to_string(),
        OutputMode::Table => Table::new(rows).with(Style::modern()).to_string(),
    })
}

pub fn print_rows<T: Tabled + Serialize>(
    rows: &[T],
    mode: OutputMode,
    empty: &str,
) -> anyhow::Result<()> {
    println!("{}", render_rows(rows, mode, empty)?);
    Ok(())
}

/// One line per field, labels padded to the widest; `snake_case` keys read
/// as words and nulls as `-`
pub fn render_fields<T: Serialize>(item: &T, mode: OutputMode) -> anyhow::Result<String> {
    let map = match serde_json::to_value(item)? {
        serde_json::Value::Object(map) if mode == OutputMode::Table => map,
        other => return Ok(serde_json::to_string_pretty(&other)?),
    };

    let width = map.keys().map(String::len).max().unwrap_or(0);
    let lines: Vec<String> = map
        .into_iter()
        .map(|(key, value)| {
            let shown = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            format!("{:<width$}  {}", key.replace('_', " "), shown)
        })
        .collect();
    Ok(lines.join("\n"))
}

pub fn print_fields<T: Serialize>(item: &T, mode: OutputMode) -> anyhow::Result<()> {
    println!("{}", render_fields(item, mode)?);
    Ok(())
}

/// `label  $ 37.000` in the given currency
pub fn print_amount(label: &str, amount: Decimal, currency: Currency) {
    println!("{label}  {}", currency.format(amount));
}

/// Outcome of an interactive command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Done,
    /// Input rejected, state unchanged
    Ignored,
    Caution,
}

pub fn notify(notice: Notice, msg: &str) {
    match notice {
        Notice::Done => println!("\x1b[32m✓ {msg}\x1b[0m"),
        Notice::Ignored => println!("\x1b[90m· {msg}\x1b[0m"),
        Notice::Caution => println!("\x1b[33m! {msg}\x1b[0m"),
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct BetRow {
    pub id: String,
    pub date: String,
    pub sport: String,
    pub event: String,
    pub pick: String,
    pub odds: String,
    pub closing: String,
    pub stake: String,
    pub status: String,
    pub profit: String,
    #[tabled(rename = "clv %")]
    pub clv: String,
}

impl BetRow {
    pub fn new(bet: &BetRecord, exchange: &ExchangeContext) -> Self {
        Self {
            id: bet.id.to_string(),
            date: bet.date.clone(),
            sport: bet.segment_or_other().to_string(),
            event: bet.event.clone(),
            pick: bet.pick.clone(),
            odds: bet.odds.to_string(),
            closing: bet.closing_odds.map(|c| c.to_string()).unwrap_or_default(),
            stake: exchange.format(bet.stake),
            status: bet.status.to_string(),
            profit: exchange.format(bet.profit()),
            clv: bet
                .clv_edge()
                .map(|e| format!("{:.2}", round2(e)))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct SegmentRow {
    pub segment: String,
    pub bets: u32,
    pub won: u32,
    #[tabled(rename = "win %")]
    pub win_rate: String,
    pub invested: String,
    pub returned: String,
    pub profit: String,
    #[tabled(rename = "roi %")]
    pub roi: String,
}

impl SegmentRow {
    /// `stats` must already be in display units
    pub fn new(row: &SegmentStats, exchange: &ExchangeContext) -> Self {
        let currency = exchange.display_currency();
        let stats = &row.stats;
        Self {
            segment: row.segment.to_string(),
            bets: stats.total_bets,
            won: stats.won,
            win_rate: format!("{:.1}", stats.win_rate()),
            invested: currency.format(stats.invested),
            returned: currency.format(stats.returned),
            profit: currency.format(stats.profit()),
            roi: format!("{:.1}", stats.roi()),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct EquityRow {
    pub index: u32,
    pub bet: String,
    pub bankroll: String,
}

impl EquityRow {
    /// `point` must already be in display units
    pub fn new(point: &EquityPoint, exchange: &ExchangeContext) -> Self {
        Self {
            index: point.index,
            bet: point.bet_id.map(|id| id.to_string()).unwrap_or_else(|| "start".to_string()),
            bankroll: exchange.display_currency().format(point.value),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ClvRow {
    pub id: String,
    pub event: String,
    pub status: String,
    pub odds: String,
    pub closing: String,
    #[tabled(rename = "edge %")]
    pub edge: String,
}

impl From<&ClvEntry> for ClvRow {
    fn from(entry: &ClvEntry) -> Self {
        Self {
            id: entry.bet_id.to_string(),
            event: entry.event.clone(),
            status: entry.status.to_string(),
            odds: entry.odds.to_string(),
            closing: entry.closing_odds.to_string(),
            edge: format!("{:.2}", entry.edge_percent),
        }
    }
}
