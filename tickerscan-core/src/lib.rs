//! TickerScan Core: price series, indicator engine, price providers, symbol sources.
//!
//! This crate contains the numerical heart of a scan:
//! - Domain types (price points, price series, indicator snapshots)
//! - SMA and simple-rolling-mean RSI over a close series
//! - Buy/sell classification from the latest indicator values
//! - The `PriceProvider` trait and its Yahoo Finance implementation
//! - Ordered symbol sources with first-success fallback

pub mod analysis;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod symbols;

pub use analysis::{analyze, AnalysisConfig, Analyzer, INSUFFICIENT_DATA};
pub use domain::{IndicatorSnapshot, PricePoint, PriceSeries, SeriesError};
