//! Price series providers.

pub mod provider;
pub mod yahoo;

pub use provider::{DataError, PriceProvider};
pub use yahoo::{YahooConfig, YahooProvider};
