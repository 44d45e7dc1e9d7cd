//! Plain-text table sink, also used as the fallback display.

use std::io::{self, Write};

use chrono::NaiveDateTime;
use tickerscan_core::IndicatorSnapshot;

use super::{table_rows, PublishReceipt, ResultSink, SinkError};

pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Fixed-width table, columns sized to their widest cell.
pub fn render_table(snapshots: &[IndicatorSnapshot], updated_at: NaiveDateTime) -> String {
    let cells: Vec<Vec<String>> = table_rows(snapshots, updated_at)
        .iter()
        .map(|row| row.iter().map(|c| c.display()).collect())
        .collect();

    let columns = cells.first().map_or(0, Vec::len);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (n, row) in cells.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}", w = *w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
        if n == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join("  "));
            out.push('\n');
        }
    }
    out
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn describe(&self) -> String {
        "console".to_string()
    }

    fn publish(
        &mut self,
        snapshots: &[IndicatorSnapshot],
        updated_at: NaiveDateTime,
    ) -> Result<PublishReceipt, SinkError> {
        let table = render_table(snapshots, updated_at);
        self.out
            .write_all(table.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| SinkError::Write {
                message: e.to_string(),
                location: None,
            })?;
        Ok(PublishReceipt {
            destination: self.describe(),
            rows: snapshots.len(),
        })
    }
}
