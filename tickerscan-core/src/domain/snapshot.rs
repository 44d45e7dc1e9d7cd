//! IndicatorSnapshot: one symbol's derived result for a single run.

use serde::{Deserialize, Serialize};

/// Error messages longer than this are truncated before they reach a sink.
pub const MAX_ERROR_LEN: usize = 100;

/// Read-only analysis result for one symbol.
///
/// Numeric fields are already rounded for presentation. A snapshot carrying an
/// `error` has every numeric and signal field set to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi: Option<f64>,
    pub buy_signal: Option<bool>,
    pub sell_signal: Option<bool>,
    pub error: Option<String>,
}

impl IndicatorSnapshot {
    /// Snapshot for a symbol that could not be analyzed.
    pub fn failed(symbol: impl Into<String>, message: impl AsRef<str>) -> Self {
        Self {
            symbol: symbol.into(),
            current_price: None,
            sma20: None,
            sma50: None,
            sma200: None,
            rsi: None,
            buy_signal: None,
            sell_signal: None,
            error: Some(truncate_error(message.as_ref())),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when every numeric and signal field is populated.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
            && self.current_price.is_some()
            && self.sma20.is_some()
            && self.sma50.is_some()
            && self.sma200.is_some()
            && self.rsi.is_some()
            && self.buy_signal.is_some()
            && self.sell_signal.is_some()
    }

    /// Short signal label for progress output: "BUY", "SELL", "BUY SELL" or "".
    pub fn signal_label(&self) -> String {
        let buy = if self.buy_signal == Some(true) { "BUY" } else { "" };
        let sell = if self.sell_signal == Some(true) { "SELL" } else { "" };
        format!("{buy} {sell}").trim().to_string()
    }
}

/// Cut a diagnostic to `MAX_ERROR_LEN` characters on a char boundary.
pub fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_LEN).collect()
}
