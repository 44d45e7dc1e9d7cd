//! Indicator implementations over a daily close series.
//!
//! Indicators are pure functions: closes in, a parallel series out. An output
//! slot is `None` while the window is still warming up or whenever the window
//! touches an undefined close. The engine only consumes the latest value, but
//! the full series is kept available for inspection and testing.

pub mod rsi;
pub mod sma;

pub use rsi::{compute_rsi, rsi_from_averages, Rsi};
pub use sma::{compute_sma, Sma};

/// Trait for close-series indicators.
///
/// # Look-ahead guard
/// The value at index t depends only on closes `0..=t`; truncating the input
/// after t never changes it.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading slots that are always `None`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole series (same length as `closes`).
    fn compute(&self, closes: &[Option<f64>]) -> Vec<Option<f64>>;

    /// Value at the most recent index.
    fn latest(&self, closes: &[Option<f64>]) -> Option<f64> {
        self.compute(closes).last().copied().flatten()
    }
}

/// Wrap plain closes as fully defined values.
pub fn defined(closes: &[f64]) -> Vec<Option<f64>> {
    closes.iter().map(|&c| Some(c)).collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
