//! Symbol sources: where the list of tickers to scan comes from.
//!
//! Sources are tried in order by a `SymbolChain`; the first one that yields a
//! non-empty list wins. Every source normalizes its output the same way.

pub mod index_page;
pub mod static_list;

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{info, warn};

pub use index_page::{parse_constituent_table, IndexConstituentsSource, IndexPageConfig};
pub use static_list::{StaticSymbols, DEFAULT_SYMBOLS};

/// Header-like tokens that show up in hand-maintained symbol columns.
pub const DEFAULT_EXCLUDED: &[&str] = &["SYMBOL", "TICKER", "STOCK", "ETF"];

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("symbol source unavailable: {0}")]
    Unavailable(String),

    #[error("symbol source request failed: {0}")]
    Request(String),

    #[error("could not parse symbol list: {0}")]
    Parse(String),
}

/// A provider of ticker symbols.
pub trait SymbolSource {
    /// Short name used in logs and run reports.
    fn name(&self) -> &str;

    /// Fetch the normalized symbol list. An empty list means "nothing here".
    fn fetch(&self) -> Result<Vec<String>, SymbolError>;
}

/// The winning list and which source produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSymbols {
    pub symbols: Vec<String>,
    pub source: String,
}

/// Ordered fallback list of symbol sources.
#[derive(Default)]
pub struct SymbolChain {
    sources: Vec<Box<dyn SymbolSource + Send>>,
}

impl SymbolChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl SymbolSource + Send + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Try each source in order; the first non-empty success wins.
    ///
    /// Returns `None` when every source failed or came back empty.
    pub fn resolve(&self) -> Option<ResolvedSymbols> {
        for source in &self.sources {
            match source.fetch() {
                Ok(symbols) if !symbols.is_empty() => {
                    info!(source = source.name(), count = symbols.len(), "resolved symbols");
                    return Some(ResolvedSymbols {
                        symbols,
                        source: source.name().to_string(),
                    });
                }
                Ok(_) => warn!(source = source.name(), "symbol source returned no symbols"),
                Err(e) => warn!(source = source.name(), error = %e, "symbol source failed"),
            }
        }
        None
    }
}

/// Trim, uppercase, drop blanks and header tokens, deduplicate, sort.
pub fn normalize_symbols<I, S>(raw: I, excluded: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| !excluded.iter().any(|x| x.eq_ignore_ascii_case(s)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `DEFAULT_EXCLUDED` as owned strings, for configs.
pub fn default_excluded() -> Vec<String> {
    DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect()
}
