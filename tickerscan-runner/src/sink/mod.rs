//! Result sinks: where a finished scan's table goes.
//!
//! Every sink writes the same ten-column table, built once by [`table_rows`].
//! Publishing is a full overwrite; no sink merges with earlier output.

pub mod console;
pub mod csv_file;
pub mod sheet;

use chrono::NaiveDateTime;
use thiserror::Error;
use tickerscan_core::IndicatorSnapshot;

pub use self::console::ConsoleSink;
pub use self::csv_file::CsvSink;
pub use self::sheet::SheetSink;

/// Column headers, in output order.
pub const TABLE_HEADERS: [&str; 10] = [
    "Symbol",
    "Current Price",
    "20-Day SMA",
    "50-Day SMA",
    "200-Day SMA",
    "RSI",
    "Buy Opportunity",
    "Sell Opportunity",
    "Last Updated",
    "Error",
];

/// Format of the "Last Updated" column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink could not be set up at all (credentials, identifiers).
    #[error("sink not configured: {0}")]
    Configuration(String),

    /// The destination exists, or was being created, but the write failed.
    #[error("write failed: {message}")]
    Write {
        message: String,
        /// Where the operator can look for partial output, when known.
        location: Option<String>,
    },
}

/// Confirmation of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub destination: String,
    /// Data rows written, header excluded.
    pub rows: usize,
}

pub trait ResultSink {
    /// Human-readable destination, for logs.
    fn describe(&self) -> String;

    fn publish(
        &mut self,
        snapshots: &[IndicatorSnapshot],
        updated_at: NaiveDateTime,
    ) -> Result<PublishReceipt, SinkError>;
}

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Display form used by the text sinks.
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(v) => format!("{v:.2}"),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Number(v) => serde_json::json!(v),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Empty => serde_json::Value::String(String::new()),
        }
    }
}

fn number(value: Option<f64>) -> CellValue {
    value.map_or(CellValue::Empty, CellValue::Number)
}

fn flag(value: Option<bool>) -> CellValue {
    match value {
        Some(true) => CellValue::Text("YES".into()),
        Some(false) => CellValue::Text("NO".into()),
        None => CellValue::Empty,
    }
}

/// The data row for one snapshot.
pub fn snapshot_row(snapshot: &IndicatorSnapshot, updated_at: NaiveDateTime) -> Vec<CellValue> {
    vec![
        CellValue::Text(snapshot.symbol.clone()),
        number(snapshot.current_price),
        number(snapshot.sma20),
        number(snapshot.sma50),
        number(snapshot.sma200),
        number(snapshot.rsi),
        flag(snapshot.buy_signal),
        flag(snapshot.sell_signal),
        CellValue::Text(updated_at.format(TIMESTAMP_FORMAT).to_string()),
        snapshot
            .error
            .as_ref()
            .map_or(CellValue::Empty, |e| CellValue::Text(e.clone())),
    ]
}

/// Header row followed by one row per snapshot, in input order.
pub fn table_rows(
    snapshots: &[IndicatorSnapshot],
    updated_at: NaiveDateTime,
) -> Vec<Vec<CellValue>> {
    let header = TABLE_HEADERS
        .iter()
        .map(|h| CellValue::Text((*h).to_string()))
        .collect();
    std::iter::once(header)
        .chain(snapshots.iter().map(|s| snapshot_row(s, updated_at)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    fn complete() -> IndicatorSnapshot {
        IndicatorSnapshot {
            symbol: "AAPL".into(),
            current_price: Some(180.25),
            sma20: Some(178.0),
            sma50: Some(175.5),
            sma200: Some(170.12),
            rsi: Some(28.41),
            buy_signal: Some(true),
            sell_signal: Some(false),
            error: None,
        }
    }

    #[test]
    fn complete_row_layout() {
        let row = snapshot_row(&complete(), stamp());
        assert_eq!(row.len(), TABLE_HEADERS.len());
        assert_eq!(row[0], CellValue::Text("AAPL".into()));
        assert_eq!(row[1], CellValue::Number(180.25));
        assert_eq!(row[6], CellValue::Text("YES".into()));
        assert_eq!(row[7], CellValue::Text("NO".into()));
        assert_eq!(row[8], CellValue::Text("2024-03-01 09:30:05".into()));
        assert_eq!(row[9], CellValue::Empty);
    }

    #[test]
    fn error_row_leaves_metrics_blank() {
        let snap = IndicatorSnapshot::failed("ZZZZ", "Insufficient data");
        let row = snapshot_row(&snap, stamp());
        assert_eq!(row[0], CellValue::Text("ZZZZ".into()));
        assert!(row[1..8].iter().all(|c| *c == CellValue::Empty));
        assert_eq!(row[9], CellValue::Text("Insufficient data".into()));
    }

    #[test]
    fn table_starts_with_header() {
        let rows = table_rows(&[complete()], stamp());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::Text("Symbol".into()));
        assert_eq!(rows[0][9], CellValue::Text("Error".into()));
    }

    #[test]
    fn display_forms() {
        assert_eq!(CellValue::Number(28.4).display(), "28.40");
        assert_eq!(CellValue::Empty.display(), "");
        assert_eq!(CellValue::Empty.to_json(), serde_json::json!(""));
    }
}
