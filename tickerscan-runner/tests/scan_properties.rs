//! Property tests for the scan loop.
//!
//! For any mix of provider outcomes:
//! 1. Exactly one snapshot per input symbol, in input order
//! 2. One gap pause between consecutive symbols, one cooldown per failure
//! 3. Rate-limited symbols get the long cooldown, other failures the short one

use std::time::Duration;

use chrono::NaiveDate;
use proptest::prelude::*;
use tickerscan_core::data::{DataError, PriceProvider};
use tickerscan_core::PriceSeries;
use tickerscan_runner::{RecordingSleeper, ScanConfig, Scanner, SilentProgress};

/// Symbol names encode the canned outcome: `OK*`, `RL*`, `ER*`, `IN*`.
struct PrefixProvider;

impl PriceProvider for PrefixProvider {
    fn name(&self) -> &str {
        "prefix"
    }

    fn fetch_daily_closes(
        &self,
        symbol: &str,
        _lookback_days: u32,
    ) -> Result<PriceSeries, DataError> {
        match &symbol[..2] {
            "OK" => {
                let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
                let closes: Vec<f64> = (0..205).map(|i| 50.0 + (i % 7) as f64).collect();
                Ok(PriceSeries::from_closes(symbol, start, &closes))
            }
            "RL" => Err(DataError::Other("HTTP 429 Too Many Requests".into())),
            "IN" => Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            }),
            _ => Err(DataError::Timeout("read timed out".into())),
        }
    }
}

fn arb_symbols() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["OK", "RL", "ER", "IN"]), 0..12).prop_map(
        |kinds| {
            kinds
                .into_iter()
                .enumerate()
                .map(|(i, k)| format!("{k}{i}"))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn one_snapshot_per_symbol_in_order(symbols in arb_symbols()) {
        let config = ScanConfig::default();
        let sleeper = RecordingSleeper::new();
        let scanner = Scanner::new(&config, &PrefixProvider, &sleeper, &SilentProgress);

        let snaps = scanner.analyze_all(&symbols);
        let got: Vec<&str> = snaps.iter().map(|s| s.symbol.as_str()).collect();
        let want: Vec<&str> = symbols.iter().map(String::as_str).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn pauses_match_outcomes(symbols in arb_symbols()) {
        let config = ScanConfig::default();
        let sleeper = RecordingSleeper::new();
        let scanner = Scanner::new(&config, &PrefixProvider, &sleeper, &SilentProgress);
        scanner.analyze_all(&symbols);

        let recorded = sleeper.recorded();
        let rate_limited = symbols.iter().filter(|s| s.starts_with("RL")).count();
        let failed = symbols.iter().filter(|s| !s.starts_with("OK")).count();
        let gaps = symbols.len().saturating_sub(1);

        prop_assert_eq!(recorded.len(), gaps + failed);
        let long = recorded.iter().filter(|d| **d == Duration::from_secs(10)).count();
        let short = recorded.iter().filter(|d| **d == Duration::from_secs(5)).count();
        prop_assert_eq!(long, rate_limited);
        prop_assert_eq!(short, failed - rate_limited);
    }
}
