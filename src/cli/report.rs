//! Read-side reports: stats, equity, clv, export

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::output::{self, ClvRow, EquityRow, Notice, OutputMode, SegmentRow};
use crate::analytics::clv_summary;
use crate::services::{export_csv_string, export_file_name, AccountSession};

#[derive(Debug, Serialize)]
struct OverallView {
    settled: u32,
    won: u32,
    lost: u32,
    pending: u32,
    void: u32,
    win_rate: String,
    roi: String,
    invested: String,
    profit: String,
    current_capital: String,
}

pub fn stats(session: &AccountSession, mode: OutputMode) -> Result<()> {
    let summary = session.summary();
    let overall = &summary.overall;
    let view = OverallView {
        settled: overall.total_bets,
        won: overall.won,
        lost: overall.lost(),
        pending: summary.pending,
        void: summary.void,
        win_rate: format!("{:.1}%", overall.win_rate()),
        roi: format!("{:.1}%", overall.roi()),
        invested: session.format(overall.invested),
        profit: session.format(overall.profit()),
        current_capital: session.format(summary.current_capital),
    };

    let report = session.performance();
    let rows: Vec<SegmentRow> = report
        .segments
        .iter()
        .map(|s| SegmentRow::new(s, session.exchange()))
        .collect();

    match mode {
        OutputMode::Json => {
            let payload = serde_json::json!({ "overall": view, "segments": rows });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputMode::Table => {
            output::print_fields(&view, mode)?;
            println!();
            output::print_rows(&rows, mode, "No settled bets yet")?;
        }
    }
    Ok(())
}

pub fn equity(session: &AccountSession, mode: OutputMode) -> Result<()> {
    let curve = session.equity_curve();
    let currency = session.exchange().display_currency();
    let rows: Vec<EquityRow> = curve
        .points()
        .iter()
        .map(|p| EquityRow::new(p, session.exchange()))
        .collect();
    output::print_rows(&rows, mode, "No bankroll history")?;

    if mode == OutputMode::Table {
        if curve.is_renderable() {
            output::print_amount("max drawdown", curve.max_drawdown(), currency);
        } else {
            output::notify(Notice::Caution, "Not enough settled bets for a curve");
        }
    }
    Ok(())
}

pub fn clv(session: &AccountSession, mode: OutputMode) -> Result<()> {
    let rows: Vec<ClvRow> = session.clv().iter().map(ClvRow::from).collect();
    let summary = clv_summary(session.ledger().records());

    match mode {
        OutputMode::Json => {
            let payload = serde_json::json!({ "bets": rows, "summary": summary });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputMode::Table => {
            output::print_rows(&rows, mode, "No closing prices recorded")?;
            if let Some(avg) = summary.average_edge {
                println!();
                println!("average clv  {:.2}%", avg);
                println!(
                    "beat close   {}/{} ({:.1}%)",
                    summary.beat_close,
                    summary.tracked,
                    summary.beat_close_rate()
                );
            }
        }
    }
    Ok(())
}

pub async fn export(session: &AccountSession, output_path: Option<PathBuf>) -> Result<()> {
    let csv = export_csv_string(session.ledger().records())?;
    let path = output_path.unwrap_or_else(|| {
        PathBuf::from(export_file_name(
            session.account_id(),
            Local::now().date_naive(),
        ))
    });

    tokio::fs::write(&path, csv)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), bets = session.ledger().len(), "ledger exported");
    output::notify(
        Notice::Done,
        &format!("Exported {} bets to {}", session.ledger().len(), path.display()),
    );
    Ok(())
}
