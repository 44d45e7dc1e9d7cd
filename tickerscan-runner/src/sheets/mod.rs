//! Minimal Google Sheets / Drive REST client.
//!
//! Covers only what a scan needs: find-or-create a spreadsheet, find-or-add a
//! worksheet, share it, clear it, write values, read a column, and apply cell
//! formatting through `batchUpdate`.

pub mod auth;
pub mod client;
pub mod format;

use thiserror::Error;

pub use auth::{fetch_access_token, JwtClaims, SCOPES};
pub use client::{a1_range, spreadsheet_url, GoogleSheetsClient, WorksheetInfo};
pub use format::{format_requests, Rgb, BUY_TINT, SELL_TINT};

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {message}")]
    Response { url: String, message: String },
}
