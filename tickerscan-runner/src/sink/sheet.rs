//! Google Sheets sink.

use chrono::NaiveDateTime;
use tickerscan_core::IndicatorSnapshot;
use tracing::{info, warn};

use super::{table_rows, PublishReceipt, ResultSink, SinkError, TABLE_HEADERS};
use crate::config::SheetsConfig;
use crate::credentials::load_service_account;
use crate::sheets::{format_requests, spreadsheet_url, GoogleSheetsClient, WorksheetInfo};

const NEW_WORKSHEET_ROWS: u32 = 1000;

/// An opened results worksheet, ready to be overwritten.
pub struct SheetSink {
    client: GoogleSheetsClient,
    spreadsheet_id: String,
    worksheet: WorksheetInfo,
    url: String,
}

impl SheetSink {
    /// Authenticate, then find or create the spreadsheet and worksheet.
    ///
    /// Credential and authentication problems are `Configuration` errors;
    /// anything that fails after that is a `Write` error.
    pub fn open(config: &SheetsConfig) -> Result<Self, SinkError> {
        let key = load_service_account(&config.credentials_file)
            .map_err(|e| SinkError::Configuration(e.to_string()))?;
        let client = GoogleSheetsClient::connect(&key, config)
            .map_err(|e| SinkError::Configuration(e.to_string()))?;

        let (spreadsheet_id, created) = client
            .open_or_create(&config.sheet_name)
            .map_err(|e| SinkError::Write {
                message: e.to_string(),
                location: None,
            })?;
        let url = spreadsheet_url(&spreadsheet_id);
        if created {
            info!(sheet = %config.sheet_name, %url, "created spreadsheet");
        } else {
            info!(sheet = %config.sheet_name, %url, "opened spreadsheet");
        }

        let write_err = |e: crate::sheets::SheetsError| SinkError::Write {
            message: e.to_string(),
            location: Some(url.clone()),
        };
        let existing = client
            .worksheets(&spreadsheet_id)
            .map_err(write_err)?
            .into_iter()
            .find(|w| w.title == config.worksheet_name);
        let worksheet = match existing {
            Some(w) => w,
            None => {
                let w = client
                    .add_worksheet(
                        &spreadsheet_id,
                        &config.worksheet_name,
                        NEW_WORKSHEET_ROWS,
                        TABLE_HEADERS.len() as u32,
                    )
                    .map_err(write_err)?;
                info!(worksheet = %w.title, "created worksheet");
                w
            }
        };

        if let Some(email) = config.share_with.as_deref().filter(|e| !e.is_empty()) {
            match client.share(&spreadsheet_id, email, "writer") {
                Ok(()) => info!(%email, "shared spreadsheet"),
                Err(e) => {
                    warn!(%email, error = %e, "could not share spreadsheet; share it manually")
                }
            }
        }

        Ok(Self {
            client,
            spreadsheet_id,
            worksheet,
            url,
        })
    }
}

impl ResultSink for SheetSink {
    fn describe(&self) -> String {
        format!("Google Sheet {} ({})", self.worksheet.title, self.url)
    }

    fn publish(
        &mut self,
        snapshots: &[IndicatorSnapshot],
        updated_at: NaiveDateTime,
    ) -> Result<PublishReceipt, SinkError> {
        let rows: Vec<Vec<serde_json::Value>> = table_rows(snapshots, updated_at)
            .iter()
            .map(|row| row.iter().map(|c| c.to_json()).collect())
            .collect();
        let num_rows = rows.len();
        let title = self.worksheet.title.clone();

        let result = self
            .client
            .clear(&self.spreadsheet_id, &title)
            .and_then(|()| self.client.update_values(&self.spreadsheet_id, &title, rows))
            .and_then(|()| {
                let requests = format_requests(self.worksheet.sheet_id, num_rows);
                self.client
                    .batch_update(&self.spreadsheet_id, requests)
                    .map(drop)
            });

        match result {
            Ok(()) => Ok(PublishReceipt {
                destination: self.url.clone(),
                rows: snapshots.len(),
            }),
            Err(e) => Err(SinkError::Write {
                message: e.to_string(),
                location: Some(self.url.clone()),
            }),
        }
    }
}
