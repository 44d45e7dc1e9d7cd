//! Hardcoded last-resort symbol list.

use super::{SymbolError, SymbolSource};

/// Large, liquid US names used when no other source answers.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "BRK.B", "V", "JNJ",
];

/// A fixed symbol list.
#[derive(Debug, Clone)]
pub struct StaticSymbols {
    symbols: Vec<String>,
}

impl StaticSymbols {
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }

    pub fn default_us() -> Self {
        Self::new(DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect())
    }
}

impl Default for StaticSymbols {
    fn default() -> Self {
        Self::default_us()
    }
}

impl SymbolSource for StaticSymbols {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self) -> Result<Vec<String>, SymbolError> {
        Ok(super::normalize_symbols(&self.symbols, &[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_is_normalized() {
        let symbols = StaticSymbols::default_us().fetch().unwrap();
        assert_eq!(symbols.len(), DEFAULT_SYMBOLS.len());
        assert!(symbols.contains(&"BRK.B".to_string()));
        assert!(symbols.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn custom_list_is_uppercased() {
        let s = StaticSymbols::new(vec!["spy".into(), "qqq".into()]);
        assert_eq!(s.fetch().unwrap(), vec!["QQQ", "SPY"]);
    }
}
