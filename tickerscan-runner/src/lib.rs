//! TickerScan Runner: everything around the indicator engine.
//!
//! This crate builds on `tickerscan-core` to provide:
//! - TOML run configuration with per-section defaults
//! - Request pacing with error and rate-limit cooldowns
//! - Service-account credential discovery
//! - A small Google Sheets / Drive REST client
//! - Result sinks (Google Sheet, CSV file, console table)
//! - The sheet-backed symbol source and the default source chain
//! - The sequential scan orchestrator

pub mod config;
pub mod credentials;
pub mod pacing;
pub mod scanner;
pub mod sheets;
pub mod sink;
pub mod symbols;

pub use config::{ConfigError, ScanConfig, SheetsConfig, DEFAULT_CONFIG_FILE};
pub use credentials::{discover_credentials, load_service_account, CredentialError};
pub use pacing::{Pacer, PacingConfig, Pause, RecordingSleeper, Sleeper, ThreadSleeper};
pub use scanner::{
    run_scan, PublishOutcome, ScanProgress, ScanReport, Scanner, SilentProgress, StdoutProgress,
};
pub use sink::{
    ConsoleSink, CsvSink, PublishReceipt, ResultSink, SheetSink, SinkError, TABLE_HEADERS,
};
pub use symbols::{build_symbol_chain, SheetSymbolSource};
