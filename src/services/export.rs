//! Flat CSV export of a ledger snapshot

use chrono::NaiveDate;
use std::io::Write;

use crate::domain::BetRecord;
use crate::error::Result;
use crate::persistence::ledger_store::file_stem;

pub const CSV_HEADER: [&str; 10] = [
    "ID",
    "Date",
    "Event",
    "Pick",
    "Odds",
    "ClosingOdds",
    "Stake",
    "Status",
    "Profit",
    "CLV_Edge%",
];

/// Columns of one exported row
fn row(bet: &BetRecord) -> [String; 10] {
    let closing = bet
        .closing_odds
        .map(|c| c.to_string())
        .unwrap_or_default();
    let clv = bet
        .clv_edge()
        .map(|e| format!("{:.2}", e))
        .unwrap_or_else(|| "0".to_string());

    [
        bet.id.to_string(),
        bet.date.clone(),
        bet.event.clone(),
        bet.pick.clone(),
        bet.odds.to_string(),
        closing,
        bet.stake.to_string(),
        bet.status.to_string(),
        format!("{:.2}", bet.profit()),
        clv,
    ]
}

/// Write one header row plus one row per record, in ledger order
pub fn export_csv<W: Write>(records: &[BetRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for bet in records {
        csv.write_record(row(bet))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn export_csv_string(records: &[BetRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    export_csv(records, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| crate::error::BetsmartError::Storage(e.to_string()))
}

/// `betsmart_<account>_<YYYY-MM-DD>.csv`
pub fn export_file_name(account: &str, date: NaiveDate) -> String {
    format!("betsmart_{}_{}.csv", file_stem(account), date.format("%Y-%m-%d"))
}
