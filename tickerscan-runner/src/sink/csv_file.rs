//! CSV file sink.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tickerscan_core::IndicatorSnapshot;
use tracing::info;

use super::{table_rows, PublishReceipt, ResultSink, SinkError};

/// Overwrites one CSV file per publish.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, message: impl std::fmt::Display) -> SinkError {
        SinkError::Write {
            message: message.to_string(),
            location: Some(self.path.display().to_string()),
        }
    }
}

/// Render the table as CSV text.
pub fn render_csv(
    snapshots: &[IndicatorSnapshot],
    updated_at: NaiveDateTime,
) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in table_rows(snapshots, updated_at) {
        wtr.write_record(row.iter().map(|c| c.display()))?;
    }
    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

impl ResultSink for CsvSink {
    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }

    fn publish(
        &mut self,
        snapshots: &[IndicatorSnapshot],
        updated_at: NaiveDateTime,
    ) -> Result<PublishReceipt, SinkError> {
        let text = render_csv(snapshots, updated_at).map_err(|e| self.write_error(e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        fs::write(&self.path, text).map_err(|e| self.write_error(e))?;
        info!(path = %self.path.display(), rows = snapshots.len(), "wrote CSV results");
        Ok(PublishReceipt {
            destination: self.path.display().to_string(),
            rows: snapshots.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    #[test]
    fn renders_header_and_rows() {
        let snaps = vec![IndicatorSnapshot::failed("ZZZZ", "Insufficient data")];
        let text = render_csv(&snaps, stamp()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Symbol,Current Price,20-Day SMA,50-Day SMA,200-Day SMA,RSI,\
             Buy Opportunity,Sell Opportunity,Last Updated,Error"
        );
        assert_eq!(
            lines.next().unwrap(),
            "ZZZZ,,,,,,,,2024-01-02 16:00:00,Insufficient data"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn publish_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("scan.csv");
        let mut sink = CsvSink::new(&path);

        let two = vec![
            IndicatorSnapshot::failed("AAA", "x"),
            IndicatorSnapshot::failed("BBB", "y"),
        ];
        sink.publish(&two, stamp()).unwrap();
        let receipt = sink
            .publish(&[IndicatorSnapshot::failed("CCC", "z")], stamp())
            .unwrap();

        assert_eq!(receipt.rows, 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("CCC"));
        assert!(!text.contains("AAA"));
    }
}
