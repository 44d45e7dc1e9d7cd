//! Domain types: daily closes and the per-symbol indicator snapshot.

pub mod series;
pub mod snapshot;

pub use series::{PricePoint, PriceSeries, SeriesError};
pub use snapshot::{IndicatorSnapshot, MAX_ERROR_LEN};
