//! Relative Strength Index (RSI), simple rolling-mean variant.
//!
//! avg_gain / avg_loss are plain means of the last `period` gains / losses,
//! not Wilder's exponential smoothing, so values differ from textbook RSI.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Flat windows: avg_loss == 0 → 100; both zero → 50; avg_gain == 0 → 0.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[Option<f64>]) -> Vec<Option<f64>> {
        compute_rsi(closes, self.period)
    }

    fn latest(&self, closes: &[Option<f64>]) -> Option<f64> {
        let n = closes.len();
        if n < self.period + 1 {
            return None;
        }
        rsi_at(&changes(closes), n - 1, self.period)
    }
}

/// RSI for every index; `None` before index `period` or when any of the
/// trailing `period` differences is undefined.
pub fn compute_rsi(closes: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut result = vec![None; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let changes = changes(closes);
    for (i, slot) in result.iter_mut().enumerate().skip(period) {
        *slot = rsi_at(&changes, i, period);
    }
    result
}

/// Map average gain / average loss to an RSI value.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Day-over-day differences; index 0 and any pair touching an undefined close are `None`.
fn changes(closes: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    for i in 1..closes.len() {
        if let (Some(cur), Some(prev)) = (closes[i], closes[i - 1]) {
            out[i] = Some(cur - prev);
        }
    }
    out
}

fn rsi_at(changes: &[Option<f64>], index: usize, period: usize) -> Option<f64> {
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for change in &changes[index + 1 - period..=index] {
        let ch = (*change)?;
        if ch > 0.0 {
            gain_sum += ch;
        } else {
            loss_sum -= ch;
        }
    }
    let p = period as f64;
    Some(rsi_from_averages(gain_sum / p, loss_sum / p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, defined};

    #[test]
    fn rsi_all_gains() {
        let closes = defined(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&closes);
        assert_approx(result[3].unwrap(), 100.0, 1e-9);
        assert_approx(result[5].unwrap(), 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let closes = defined(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&closes);
        assert_approx(result[3].unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let closes = defined(&[50.0; 10]);
        let result = compute_rsi(&closes, 3);
        assert_eq!(result[9], Some(50.0));
    }

    #[test]
    fn rsi_mixed_simple_mean() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // period=3 at index 4 uses changes[2..=4]: gains 0.72, losses 0.73
        // RSI = 100 - 100/(1 + 0.72/0.73)
        let closes = defined(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = compute_rsi(&closes, 3);

        assert!(result[..3].iter().all(Option::is_none));
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(result[4].unwrap(), expected, 1e-9);
    }

    #[test]
    fn rsi_differs_from_wilder_smoothing() {
        // The window slides: the early large loss drops out entirely.
        let closes = defined(&[10.0, 5.0, 6.0, 7.0, 8.0]);
        let result = compute_rsi(&closes, 3);
        assert_approx(result[4].unwrap(), 100.0, 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let closes = defined(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for (i, v) in compute_rsi(&closes, 3).iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_undefined_close_poisons_window() {
        let mut closes = defined(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0]);
        closes[3] = None;
        let result = compute_rsi(&closes, 3);
        // changes[3] and changes[4] undefined → windows ending at 3..=6 undefined
        assert!(result[3..=6].iter().all(Option::is_none));
        assert_eq!(result[7], Some(100.0));
    }

    #[test]
    fn latest_matches_series() {
        let closes: Vec<Option<f64>> = (0..60)
            .map(|i| Some(100.0 + (i as f64 * 0.7).cos() * 4.0))
            .collect();
        let rsi = Rsi::new(14);
        assert_eq!(rsi.latest(&closes), *rsi.compute(&closes).last().unwrap());
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
