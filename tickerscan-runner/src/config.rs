//! Serializable scan configuration.
//!
//! Every section carries `#[serde(default)]`, so a TOML file only needs the
//! keys it wants to change.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tickerscan_core::data::YahooConfig;
use tickerscan_core::symbols::{default_excluded, IndexPageConfig, DEFAULT_SYMBOLS};
use tickerscan_core::AnalysisConfig;

use crate::pacing::PacingConfig;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "tickerscan.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one scan run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub analysis: AnalysisConfig,
    pub pacing: PacingConfig,
    pub provider: ProviderConfig,
    pub symbols: SymbolsConfig,
    pub sheets: SheetsConfig,
}

/// Price provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Calendar days of history requested per symbol.
    pub lookback_days: u32,
    #[serde(flatten)]
    pub yahoo: YahooConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            lookback_days: 400,
            yahoo: YahooConfig::default(),
        }
    }
}

/// Symbol acquisition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Worksheet holding the user-maintained list (first column).
    pub worksheet: String,
    /// Header-like tokens dropped from every source.
    pub excluded: Vec<String>,
    /// Last-resort list.
    pub fallback: Vec<String>,
    pub index: IndexPageConfig,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            worksheet: "Symbol List".into(),
            excluded: default_excluded(),
            fallback: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            index: IndexPageConfig::default(),
        }
    }
}

/// Google Sheets destination and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Service-account key file name, searched for in cwd, exe dir, then home.
    pub credentials_file: String,
    pub sheet_name: String,
    pub worksheet_name: String,
    /// Principal the spreadsheet is shared with as writer.
    pub share_with: Option<String>,
    pub sheets_api: String,
    pub drive_api: String,
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            credentials_file: "credentials.json".into(),
            sheet_name: "StockAnalysis".into(),
            worksheet_name: "Stock Metrics".into(),
            share_with: None,
            sheets_api: "https://sheets.googleapis.com/v4/spreadsheets".into(),
            drive_api: "https://www.googleapis.com/drive/v3".into(),
            timeout_secs: 30,
        }
    }
}

impl ScanConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path if given, else `tickerscan.toml` in the working directory, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the engine cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        if a.sma_short == 0 || a.sma_medium == 0 || a.sma_long == 0 || a.rsi_period == 0 {
            return Err(ConfigError::Invalid(
                "indicator windows must be at least 1".into(),
            ));
        }
        if a.min_history < a.sma_long {
            return Err(ConfigError::Invalid(format!(
                "min_history ({}) must cover the long SMA window ({})",
                a.min_history, a.sma_long
            )));
        }
        if a.oversold >= a.overbought {
            return Err(ConfigError::Invalid(format!(
                "oversold ({}) must be below overbought ({})",
                a.oversold, a.overbought
            )));
        }
        if self.sheets.sheet_name.trim().is_empty() || self.sheets.worksheet_name.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "sheet_name and worksheet_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
