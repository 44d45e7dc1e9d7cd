//! Blocking REST calls against the Sheets v4 and Drive v3 APIs.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::auth::{fetch_access_token, SCOPES};
use super::SheetsError;
use crate::config::SheetsConfig;
use crate::credentials::ServiceAccountKey;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Browser URL of a spreadsheet.
pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}")
}

/// A1 notation with the worksheet title quoted: `'Stock Metrics'!A1`.
pub fn a1_range(worksheet: &str, cells: &str) -> String {
    let quoted = format!("'{}'", worksheet.replace('\'', "''"));
    if cells.is_empty() {
        quoted
    } else {
        format!("{quoted}!{cells}")
    }
}

/// Title and numeric id of one worksheet (tab).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetInfo {
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spreadsheet {
    spreadsheet_id: Option<String>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Authorized client for one service account.
pub struct GoogleSheetsClient {
    http: Client,
    token: String,
    sheets_api: String,
    drive_api: String,
}

impl GoogleSheetsClient {
    /// Build the HTTP client and obtain an access token.
    pub fn connect(key: &ServiceAccountKey, config: &SheetsConfig) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SheetsError::Auth(format!("build HTTP client: {e}")))?;
        let token = fetch_access_token(&http, key, SCOPES)?;
        Ok(Self {
            http,
            token,
            sheets_api: config.sheets_api.trim_end_matches('/').to_string(),
            drive_api: config.drive_api.trim_end_matches('/').to_string(),
        })
    }

    /// Id of the first non-trashed spreadsheet with this exact name.
    pub fn find_spreadsheet(&self, name: &str) -> Result<Option<String>, SheetsError> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let url = self.url(&self.drive_api, &["files"], &[("q", &query), ("fields", "files(id)")])?;
        let list: DriveFileList = self.send_json(self.http.get(url.clone()), &url)?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    pub fn create_spreadsheet(&self, name: &str) -> Result<String, SheetsError> {
        let url = self.url(&self.sheets_api, &[], &[])?;
        let body = json!({ "properties": { "title": name } });
        let created: Spreadsheet = self.send_json(self.http.post(url.clone()).json(&body), &url)?;
        created.spreadsheet_id.ok_or_else(|| SheetsError::Response {
            url: url.to_string(),
            message: "created spreadsheet has no id".into(),
        })
    }

    /// Open by name, creating it when missing. The flag is true when created.
    pub fn open_or_create(&self, name: &str) -> Result<(String, bool), SheetsError> {
        match self.find_spreadsheet(name)? {
            Some(id) => Ok((id, false)),
            None => Ok((self.create_spreadsheet(name)?, true)),
        }
    }

    pub fn worksheets(&self, spreadsheet_id: &str) -> Result<Vec<WorksheetInfo>, SheetsError> {
        let url = self.url(
            &self.sheets_api,
            &[spreadsheet_id],
            &[("fields", "sheets.properties(sheetId,title)")],
        )?;
        let sheet: Spreadsheet = self.send_json(self.http.get(url.clone()), &url)?;
        Ok(sheet
            .sheets
            .into_iter()
            .map(|s| WorksheetInfo {
                sheet_id: s.properties.sheet_id,
                title: s.properties.title,
            })
            .collect())
    }

    pub fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<WorksheetInfo, SheetsError> {
        let request = json!({
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": { "rowCount": rows, "columnCount": cols }
                }
            }
        });
        let reply = self.batch_update(spreadsheet_id, vec![request])?;
        let sheet_id = reply
            .pointer("/replies/0/addSheet/properties/sheetId")
            .and_then(Value::as_i64)
            .ok_or_else(|| SheetsError::Response {
                url: format!("{}/{spreadsheet_id}:batchUpdate", self.sheets_api),
                message: "addSheet reply has no sheetId".into(),
            })?;
        Ok(WorksheetInfo {
            sheet_id,
            title: title.to_string(),
        })
    }

    /// Grant `role` on the file to a user principal.
    pub fn share(&self, file_id: &str, email: &str, role: &str) -> Result<(), SheetsError> {
        let url = self.url(
            &self.drive_api,
            &["files", file_id, "permissions"],
            &[("sendNotificationEmail", "false")],
        )?;
        let body = json!({ "type": "user", "role": role, "emailAddress": email });
        self.send_json::<Value>(self.http.post(url.clone()).json(&body), &url)?;
        Ok(())
    }

    pub fn clear(&self, spreadsheet_id: &str, worksheet: &str) -> Result<(), SheetsError> {
        let segment = format!("{}:clear", a1_range(worksheet, ""));
        let url = self.url(&self.sheets_api, &[spreadsheet_id, "values", &segment], &[])?;
        self.send_json::<Value>(self.http.post(url.clone()).json(&json!({})), &url)?;
        Ok(())
    }

    /// Write a block of rows starting at A1.
    pub fn update_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), SheetsError> {
        let range = a1_range(worksheet, "A1");
        let url = self.url(
            &self.sheets_api,
            &[spreadsheet_id, "values", &range],
            &[("valueInputOption", "RAW")],
        )?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        self.send_json::<Value>(self.http.put(url.clone()).json(&body), &url)?;
        Ok(())
    }

    /// Displayed values of one column, top to bottom.
    pub fn column_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        column: &str,
    ) -> Result<Vec<String>, SheetsError> {
        let range = a1_range(worksheet, &format!("{column}:{column}"));
        let url = self.url(
            &self.sheets_api,
            &[spreadsheet_id, "values", &range],
            &[("majorDimension", "COLUMNS")],
        )?;
        let values: ValueRange = self.send_json(self.http.get(url.clone()), &url)?;
        Ok(values
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    pub fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Value>,
    ) -> Result<Value, SheetsError> {
        let segment = format!("{spreadsheet_id}:batchUpdate");
        let url = self.url(&self.sheets_api, &[&segment], &[])?;
        let body = json!({ "requests": requests });
        self.send_json(self.http.post(url.clone()).json(&body), &url)
    }

    fn url(
        &self,
        base: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, SheetsError> {
        let mut url = Url::parse(base).map_err(|e| SheetsError::Request {
            url: base.to_string(),
            message: e.to_string(),
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| SheetsError::Request {
                url: base.to_string(),
                message: "base URL cannot carry a path".into(),
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, SheetsError> {
        debug!(%url, "sheets request");
        let resp = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SheetsError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Self::decode(resp, url)
    }

    fn decode<T: serde::de::DeserializeOwned>(resp: Response, url: &Url) -> Result<T, SheetsError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SheetsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }
        resp.json::<T>().map_err(|e| SheetsError::Response {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
