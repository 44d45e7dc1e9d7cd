//! Simple Moving Average (SMA).
//!
//! Rolling arithmetic mean of closes over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[Option<f64>]) -> Vec<Option<f64>> {
        compute_sma(closes, self.period)
    }

    /// Mean of the final window, summed directly rather than rolled.
    fn latest(&self, closes: &[Option<f64>]) -> Option<f64> {
        let n = closes.len();
        if n < self.period {
            return None;
        }
        let mut sum = 0.0;
        for close in &closes[n - self.period..] {
            sum += (*close)?;
        }
        Some(sum / self.period as f64)
    }
}

/// Trailing SMA for every index; `None` before `window - 1` or when the
/// window holds an undefined close.
pub fn compute_sma(closes: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut result = vec![None; n];
    if window == 0 || n < window {
        return result;
    }

    let mut sum = 0.0;
    let mut missing = 0usize;
    for (i, close) in closes.iter().enumerate() {
        match close {
            Some(c) => sum += c,
            None => missing += 1,
        }
        if i >= window {
            match closes[i - window] {
                Some(c) => sum -= c,
                None => missing -= 1,
            }
        }
        if i + 1 < window {
            continue;
        }
        if missing == 0 {
            result[i] = Some(sum / window as f64);
        }
    }

    result
}
