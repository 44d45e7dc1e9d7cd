//! Yahoo Finance price provider.
//!
//! Fetches daily closes from Yahoo's v8 chart API and maps HTTP failures onto
//! `DataError`. One request per call: pacing and cooldowns belong to the scanner.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{DataError, PriceProvider};
use crate::domain::{PricePoint, PriceSeries};

/// Connection settings for the Yahoo chart API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com/v8/finance/chart".into(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        }
    }
}

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    config: YahooConfig,
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Yahoo writes class shares with a dash (BRK-B) where listings use a dot (BRK.B).
    pub fn yahoo_symbol(symbol: &str) -> String {
        symbol.trim().to_uppercase().replace('.', "-")
    }

    /// Build the chart API URL for a symbol and date range.
    pub fn chart_url(base_url: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(start_ts);
        format!(
            "{base_url}/{}?period1={start_ts}&period2={end_ts}&interval=1d&includeAdjustedClose=true",
            Self::yahoo_symbol(symbol)
        )
    }

    /// Parse a chart API body into a canonical series.
    ///
    /// The close column is chosen once per series: adjusted closes when they
    /// line up with the timestamps, raw closes otherwise. Rows that are null
    /// in the chosen column (holidays, placeholder rows) are skipped.
    pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result.into_iter().next().ok_or_else(|| DataError::EmptyResult {
            symbol: symbol.to_string(),
        })?;

        let timestamps = data.timestamp.unwrap_or_default();
        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();
        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);
        let chosen = match adj_closes {
            Some(adj) if adj.len() == timestamps.len() => adj,
            _ => closes,
        };

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            if let Some(close) = chosen.get(i).copied().flatten() {
                points.push(PricePoint::new(date, close));
            }
        }

        if points.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }

        Ok(PriceSeries::from_unordered(symbol, points))
    }

    fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let url = Self::chart_url(&self.config.base_url, symbol, start, end);
        debug!(%symbol, %url, "requesting chart");

        // The URL carries epoch timestamps; keep it out of error text.
        let resp = self.client.get(&url).send().map_err(|e| {
            let timed_out = e.is_timeout();
            let message = e.without_url().to_string();
            if timed_out {
                DataError::Timeout(message)
            } else {
                DataError::NetworkUnreachable(message)
            }
        })?;

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok());
        if let Some(err) = status_error(resp.status(), retry_after, symbol) {
            return Err(err);
        }

        let body = resp.text().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to read body for {symbol}: {e}"))
        })?;
        Self::parse_chart(symbol, &body)
    }
}

/// Seconds to wait when a throttling response has no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Map a non-success HTTP status onto a `DataError`; `None` for 2xx.
///
/// 403 is how Yahoo blocks a client it considers abusive, so it counts as
/// throttling alongside 429.
pub fn status_error(
    status: StatusCode,
    retry_after: Option<&str>,
    symbol: &str,
) -> Option<DataError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN => DataError::RateLimited {
            retry_after_secs: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::NOT_FOUND => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        _ => DataError::Other(format!("HTTP {status} for {symbol}")),
    })
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_daily_closes(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, DataError> {
        let end = Utc::now().date_naive();
        let start = end - chrono::Duration::days(i64::from(lookback_days));
        self.fetch_range(symbol, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
      "chart": {
        "result": [{
          "timestamp": [1704205800, 1704292200, 1704378600, 1704465000],
          "indicators": {
            "quote": [{ "close": [185.64, 184.25, null, 181.18] }],
            "adjclose": [{ "adjclose": [184.93, null, null, 180.49] }]
          }
        }],
        "error": null
      }
    }"#;

    #[test]
    fn parses_closes_preferring_adjusted() {
        let series = YahooProvider::parse_chart("AAPL", BODY).unwrap();
        assert_eq!(series.symbol(), "AAPL");
        // Null adjusted rows are dropped, never back-filled from the raw close
        assert_eq!(series.closes(), vec![Some(184.93), Some(180.49)]);
        assert_eq!(
            series.first_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn misaligned_adjusted_column_falls_back_to_raw() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800,1704292200,1704378600],
            "indicators":{"quote":[{"close":[185.64,null,181.18]}],
            "adjclose":[{"adjclose":[184.93]}]}}],"error":null}}"#;
        let series = YahooProvider::parse_chart("AAPL", body).unwrap();
        assert_eq!(series.closes(), vec![Some(185.64), Some(181.18)]);
    }

    #[test]
    fn missing_adjusted_column_uses_raw() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800,1704292200],
            "indicators":{"quote":[{"close":[185.64,184.25]}]}}],"error":null}}"#;
        let series = YahooProvider::parse_chart("AAPL", body).unwrap();
        assert_eq!(series.closes(), vec![Some(185.64), Some(184.25)]);
    }

    #[test]
    fn success_status_is_not_an_error() {
        assert!(status_error(StatusCode::OK, None, "AAPL").is_none());
    }

    #[test]
    fn too_many_requests_reads_retry_after() {
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, Some("30"), "AAPL").unwrap();
        assert!(matches!(err, DataError::RateLimited { retry_after_secs: 30 }));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn missing_or_bad_retry_after_defaults_to_sixty() {
        let missing = status_error(StatusCode::TOO_MANY_REQUESTS, None, "AAPL").unwrap();
        assert!(matches!(missing, DataError::RateLimited { retry_after_secs: 60 }));
        let date_form = "Wed, 21 Oct 2026 07:28:00 GMT";
        let bad = status_error(StatusCode::TOO_MANY_REQUESTS, Some(date_form), "AAPL").unwrap();
        assert!(matches!(bad, DataError::RateLimited { retry_after_secs: 60 }));
    }

    #[test]
    fn forbidden_counts_as_rate_limited() {
        let err = status_error(StatusCode::FORBIDDEN, None, "AAPL").unwrap();
        assert!(matches!(err, DataError::RateLimited { retry_after_secs: 60 }));
    }

    #[test]
    fn not_found_status_maps_to_symbol_not_found() {
        let err = status_error(StatusCode::NOT_FOUND, None, "ZZZZ").unwrap();
        assert!(matches!(err, DataError::SymbolNotFound { ref symbol } if symbol == "ZZZZ"));
    }

    #[test]
    fn other_failures_carry_the_status() {
        let err = status_error(StatusCode::BAD_GATEWAY, None, "AAPL").unwrap();
        match err {
            DataError::Other(msg) => assert_eq!(msg, "HTTP 502 Bad Gateway for AAPL"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!status_error(StatusCode::BAD_GATEWAY, None, "AAPL")
            .unwrap()
            .is_rate_limited());
    }

    #[test]
    fn not_found_maps_to_symbol_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = YahooProvider::parse_chart("ZZZZ", body).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { ref symbol } if symbol == "ZZZZ"));
    }

    #[test]
    fn empty_rows_map_to_empty_result() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800],"indicators":{"quote":[{"close":[null]}]}}],"error":null}}"#;
        let err = YahooProvider::parse_chart("ZZZZ", body).unwrap_err();
        assert!(err.is_insufficient());
    }

    #[test]
    fn missing_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let err = YahooProvider::parse_chart("X", body).unwrap_err();
        assert!(matches!(err, DataError::EmptyResult { .. }));
    }

    #[test]
    fn garbage_body_is_format_change() {
        let err = YahooProvider::parse_chart("X", "<html>").unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn chart_url_uses_dash_class_symbols() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let url = YahooProvider::chart_url("https://example.test/chart", "brk.b", start, end);
        assert!(url.starts_with("https://example.test/chart/BRK-B?period1=1704067200"));
        assert!(url.contains("interval=1d"));
    }
}
