//! PriceSeries: the ordered daily close history of one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One trading day's closing price.
///
/// `close` is `None` when the provider reported the day but no usable price;
/// indicator windows touching such a day are undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close: Some(close).filter(|c| c.is_finite()),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, close: None }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("dates out of order at index {index}: {previous} then {current}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("duplicate date {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },
}

/// Daily closes for one symbol, strictly increasing by date.
///
/// Immutable once built: the only constructors validate or canonicalize ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate dates.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (i, pair) in points.windows(2).enumerate() {
            let (prev, cur) = (pair[0].date, pair[1].date);
            if cur == prev {
                return Err(SeriesError::DuplicateDate {
                    index: i + 1,
                    date: cur,
                });
            }
            if cur < prev {
                return Err(SeriesError::OutOfOrder {
                    index: i + 1,
                    previous: prev,
                    current: cur,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            points,
        })
    }

    /// Sort by date and keep the last point reported for each date.
    ///
    /// Providers sometimes append a live intraday row that repeats the last session.
    pub fn from_unordered(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut canonical: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match canonical.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => canonical.push(point),
            }
        }
        Self {
            symbol: symbol.into(),
            points: canonical,
        }
    }

    /// Convenience for tests and synthetic data: consecutive calendar days from `start`.
    pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + chrono::Duration::days(i as i64), c))
            .collect();
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Close column in date order.
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn accepts_strictly_increasing_dates() {
        let series = PriceSeries::new(
            "AAPL",
            vec![PricePoint::new(d(1), 10.0), PricePoint::new(d(4), 11.0)],
        )
        .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_close(), Some(11.0));
        assert_eq!(series.first_date(), Some(d(1)));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new(
            "AAPL",
            vec![PricePoint::new(d(1), 10.0), PricePoint::new(d(1), 11.0)],
        )
        .unwrap_err();
        assert_eq!(err, SeriesError::DuplicateDate { index: 1, date: d(1) });
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = PriceSeries::new(
            "AAPL",
            vec![PricePoint::new(d(5), 10.0), PricePoint::new(d(2), 11.0)],
        )
        .unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn from_unordered_sorts_and_keeps_last_duplicate() {
        let series = PriceSeries::from_unordered(
            "MSFT",
            vec![
                PricePoint::new(d(3), 30.0),
                PricePoint::new(d(1), 10.0),
                PricePoint::new(d(3), 31.0),
            ],
        );
        assert_eq!(series.closes(), vec![Some(10.0), Some(31.0)]);
    }

    #[test]
    fn non_finite_close_becomes_missing() {
        let p = PricePoint::new(d(1), f64::NAN);
        assert_eq!(p.close, None);
    }
}
