//! Scenario tests for the indicator engine.
//!
//! Each test builds a close series with a known shape and checks the
//! snapshot the engine derives from it.

use chrono::NaiveDate;
use tickerscan_core::indicators::{compute_rsi, compute_sma, defined};
use tickerscan_core::{analyze, PriceSeries, INSUFFICIENT_DATA};

fn series(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    PriceSeries::from_closes("TEST", start, closes)
}

/// `base` repeated `flat_len` times, a jump to `pivot`, then 14 alternating moves.
fn shaped(flat_len: usize, base: f64, pivot: f64, up: f64, down: f64) -> Vec<f64> {
    let mut closes = vec![base; flat_len];
    let mut price = pivot;
    closes.push(price);
    for i in 0..14 {
        price += if i % 2 == 0 { up } else { -down };
        closes.push(price);
    }
    closes
}

#[test]
fn fifty_point_series_is_insufficient() {
    let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
    let snap = analyze("TEST", &series(&closes));
    assert_eq!(snap.error.as_deref(), Some(INSUFFICIENT_DATA));
    assert!(snap.current_price.is_none());
    assert!(snap.sma20.is_none() && snap.sma50.is_none() && snap.sma200.is_none());
    assert!(snap.rsi.is_none());
    assert!(snap.buy_signal.is_none() && snap.sell_signal.is_none());
}

#[test]
fn strictly_increasing_series_has_rsi_100() {
    let closes: Vec<f64> = (0..215).map(|i| 50.0 + i as f64 * 0.5).collect();
    let rsi = compute_rsi(&defined(&closes), 14);
    assert_eq!(*rsi.last().unwrap(), Some(100.0));

    let snap = analyze("TEST", &series(&closes));
    assert_eq!(snap.rsi, Some(100.0));
    assert_eq!(snap.sell_signal, Some(true));
    assert_eq!(snap.buy_signal, Some(false));
}

#[test]
fn constant_series_has_flat_smas_and_neutral_rsi() {
    let closes = vec![123.45; 220];
    let snap = analyze("TEST", &series(&closes));
    assert_eq!(snap.current_price, Some(123.45));
    assert_eq!(snap.sma20, Some(123.45));
    assert_eq!(snap.sma50, Some(123.45));
    assert_eq!(snap.sma200, Some(123.45));
    // avg_gain == avg_loss == 0 everywhere: neutral 50, so neither signal fires
    assert_eq!(snap.rsi, Some(50.0));
    assert_eq!(snap.buy_signal, Some(false));
    assert_eq!(snap.sell_signal, Some(false));

    let full = compute_rsi(&defined(&closes), 14);
    assert!(full[14..].iter().all(|v| *v == Some(50.0)));
}

#[test]
fn oversold_below_trend_is_not_a_buy() {
    // Gains 7 x 1, losses 7 x 3 → RS = 1/3 → RSI = 25; price far below SMA200
    let closes = shaped(200, 200.0, 100.0, 1.0, 3.0);
    let snap = analyze("TEST", &series(&closes));
    assert_eq!(snap.rsi, Some(25.0));
    assert!(snap.current_price.unwrap() < snap.sma200.unwrap());
    assert_eq!(snap.buy_signal, Some(false));
    assert_eq!(snap.sell_signal, Some(false));
}

#[test]
fn oversold_above_trend_is_a_buy() {
    let closes = shaped(200, 50.0, 150.0, 1.0, 3.0);
    let snap = analyze("TEST", &series(&closes));
    assert_eq!(snap.rsi, Some(25.0));
    assert!(snap.current_price.unwrap() > snap.sma200.unwrap());
    assert_eq!(snap.buy_signal, Some(true));
    assert_eq!(snap.sell_signal, Some(false));
}

#[test]
fn overbought_sells_regardless_of_trend() {
    // Gains 7 x 3, losses 7 x 1 → RS = 3 → RSI = 75; price below SMA200
    let closes = shaped(200, 200.0, 100.0, 3.0, 1.0);
    let snap = analyze("TEST", &series(&closes));
    assert_eq!(snap.rsi, Some(75.0));
    assert!(snap.current_price.unwrap() < snap.sma200.unwrap());
    assert_eq!(snap.sell_signal, Some(true));
    assert_eq!(snap.buy_signal, Some(false));
}

#[test]
fn analyze_is_idempotent() {
    let closes: Vec<f64> = (0..260)
        .map(|i| 80.0 + (i as f64 * 0.21).sin() * 9.0 + i as f64 * 0.05)
        .collect();
    let s = series(&closes);
    let first = analyze("TEST", &s);
    let second = analyze("TEST", &s);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn sma_series_is_parallel_to_input() {
    let closes: Vec<f64> = (1..=250).map(f64::from).collect();
    let sma = compute_sma(&defined(&closes), 200);
    assert_eq!(sma.len(), 250);
    assert!(sma[..199].iter().all(Option::is_none));
    // mean(1..=200) = 100.5; mean(51..=250) = 150.5
    assert_eq!(sma[199], Some(100.5));
    assert_eq!(sma[249], Some(150.5));
}
