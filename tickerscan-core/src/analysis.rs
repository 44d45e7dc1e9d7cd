//! Indicator engine: one `PriceSeries` in, one `IndicatorSnapshot` out.
//!
//! Stateless and side-effect free. Signals are derived from full-precision
//! values; only the numbers stored on the snapshot are rounded.

use serde::{Deserialize, Serialize};

use crate::domain::{IndicatorSnapshot, PriceSeries};
use crate::indicators::{Indicator, Rsi, Sma};

/// Error text for series shorter than the long SMA window.
pub const INSUFFICIENT_DATA: &str = "Insufficient data";

/// Thresholds and windows used by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sma_short: usize,
    pub sma_medium: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    /// Series shorter than this produce an "Insufficient data" snapshot.
    pub min_history: usize,
    /// Buy requires RSI strictly below this.
    pub oversold: f64,
    /// Sell requires RSI strictly above this.
    pub overbought: f64,
    /// Decimal places kept on presented values.
    pub decimals: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_medium: 50,
            sma_long: 200,
            rsi_period: 14,
            min_history: 200,
            oversold: 30.0,
            overbought: 70.0,
            decimals: 2,
        }
    }
}

/// Indicator engine bound to a configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    sma_short: Sma,
    sma_medium: Sma,
    sma_long: Sma,
    rsi: Rsi,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            sma_short: Sma::new(config.sma_short),
            sma_medium: Sma::new(config.sma_medium),
            sma_long: Sma::new(config.sma_long),
            rsi: Rsi::new(config.rsi_period),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one symbol's series.
    ///
    /// Never fails: a short series yields a snapshot with `error` set to
    /// "Insufficient data" and every other field empty.
    pub fn analyze(&self, symbol: &str, series: &PriceSeries) -> IndicatorSnapshot {
        if series.len() < self.config.min_history {
            return IndicatorSnapshot::failed(symbol, INSUFFICIENT_DATA);
        }

        let closes = series.closes();
        let current_price = series.last_close();
        let sma20 = self.sma_short.latest(&closes);
        let sma50 = self.sma_medium.latest(&closes);
        let sma200 = self.sma_long.latest(&closes);
        let rsi = self.rsi.latest(&closes);

        let buy_signal = self.buy_signal(rsi, current_price, sma200);
        let sell_signal = self.sell_signal(rsi);

        let decimals = self.config.decimals;
        IndicatorSnapshot {
            symbol: symbol.to_string(),
            current_price: current_price.map(|v| round_to(v, decimals)),
            sma20: sma20.map(|v| round_to(v, decimals)),
            sma50: sma50.map(|v| round_to(v, decimals)),
            sma200: sma200.map(|v| round_to(v, decimals)),
            rsi: rsi.map(|v| round_to(v, decimals)),
            buy_signal,
            sell_signal,
            error: None,
        }
    }

    /// Oversold while still above the long-term trend.
    pub fn buy_signal(
        &self,
        rsi: Option<f64>,
        price: Option<f64>,
        sma_long: Option<f64>,
    ) -> Option<bool> {
        let (rsi, price, sma_long) = (rsi?, price?, sma_long?);
        Some(rsi < self.config.oversold && price > sma_long)
    }

    pub fn sell_signal(&self, rsi: Option<f64>) -> Option<bool> {
        rsi.map(|r| r > self.config.overbought)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Analyze with the default windows and thresholds.
pub fn analyze(symbol: &str, series: &PriceSeries) -> IndicatorSnapshot {
    Analyzer::default().analyze(symbol, series)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
