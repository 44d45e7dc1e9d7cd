//! Price provider trait and structured error types.
//!
//! The `PriceProvider` trait abstracts over price sources so the scanner can
//! run against Yahoo Finance in production and canned series in tests.

use thiserror::Error;

use crate::domain::PriceSeries;

/// Structured error types for price fetches.
///
/// These are displayable in CLI output and end up, truncated, in a snapshot's
/// error column.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price data returned for {symbol}")]
    EmptyResult { symbol: String },

    #[error("insufficient data for {symbol}: {got} closes, need {needed}")]
    InsufficientData {
        symbol: String,
        got: usize,
        needed: usize,
    },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether this failure is a throttling signal that deserves the long cooldown.
    ///
    /// Matches the explicit variant and, for untyped `Other` errors only,
    /// the usual HTTP 429 phrasings. Typed variants already say what they are.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            DataError::RateLimited { .. } => true,
            DataError::Other(message) => {
                let message = message.to_lowercase();
                message.contains("429")
                    || message.contains("rate limit")
                    || message.contains("too many requests")
            }
            _ => false,
        }
    }

    /// Whether the provider answered but with too little history to analyze.
    pub fn is_insufficient(&self) -> bool {
        matches!(
            self,
            DataError::InsufficientData { .. } | DataError::EmptyResult { .. }
        )
    }
}

/// Trait for daily close providers.
///
/// Implementations return closes in strictly increasing date order. Gap filling,
/// if any, is the provider's concern.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily closes covering the last `lookback_days` calendar days.
    fn fetch_daily_closes(&self, symbol: &str, lookback_days: u32)
        -> Result<PriceSeries, DataError>;
}
