//! Sheet-backed symbol source and the default source chain.

use tickerscan_core::symbols::{
    normalize_symbols, IndexConstituentsSource, StaticSymbols, SymbolChain, SymbolError,
    SymbolSource,
};
use tracing::{debug, warn};

use crate::config::{ScanConfig, SheetsConfig};
use crate::credentials::load_service_account;
use crate::sheets::GoogleSheetsClient;

/// Reads the first column of a user-maintained worksheet.
pub struct SheetSymbolSource {
    sheets: SheetsConfig,
    worksheet: String,
    excluded: Vec<String>,
}

impl SheetSymbolSource {
    pub fn new(sheets: SheetsConfig, worksheet: impl Into<String>, excluded: Vec<String>) -> Self {
        Self {
            sheets,
            worksheet: worksheet.into(),
            excluded,
        }
    }
}

impl SymbolSource for SheetSymbolSource {
    fn name(&self) -> &str {
        "sheet"
    }

    fn fetch(&self) -> Result<Vec<String>, SymbolError> {
        let key = load_service_account(&self.sheets.credentials_file)
            .map_err(|e| SymbolError::Unavailable(e.to_string()))?;
        let client = GoogleSheetsClient::connect(&key, &self.sheets)
            .map_err(|e| SymbolError::Unavailable(e.to_string()))?;
        let request = |e: crate::sheets::SheetsError| SymbolError::Request(e.to_string());

        let Some(id) = client.find_spreadsheet(&self.sheets.sheet_name).map_err(request)? else {
            debug!(sheet = %self.sheets.sheet_name, "no spreadsheet to read symbols from");
            return Ok(Vec::new());
        };

        let worksheets = client.worksheets(&id).map_err(request)?;
        let title = match worksheets.iter().find(|w| w.title == self.worksheet) {
            Some(w) => w.title.clone(),
            None => {
                let first = worksheets
                    .first()
                    .ok_or_else(|| SymbolError::Parse("spreadsheet has no worksheets".into()))?;
                warn!(
                    wanted = %self.worksheet,
                    using = %first.title,
                    "symbol worksheet not found, using first worksheet"
                );
                first.title.clone()
            }
        };

        let column = client.column_values(&id, &title, "A").map_err(request)?;
        Ok(normalize_symbols(column, &self.excluded))
    }
}

/// Sheet, then index constituents, then the fixed fallback list.
pub fn build_symbol_chain(config: &ScanConfig) -> SymbolChain {
    let excluded = config.symbols.excluded.clone();
    SymbolChain::new()
        .with(SheetSymbolSource::new(
            config.sheets.clone(),
            config.symbols.worksheet.clone(),
            excluded.clone(),
        ))
        .with(IndexConstituentsSource::new(config.symbols.index.clone(), excluded))
        .with(StaticSymbols::new(config.symbols.fallback.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_has_three_sources() {
        let chain = build_symbol_chain(&ScanConfig::default());
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn missing_credentials_make_sheet_source_unavailable() {
        let mut sheets = SheetsConfig::default();
        sheets.credentials_file = "/nonexistent/tickerscan-test-credentials.json".into();
        let source = SheetSymbolSource::new(sheets, "Symbol List", Vec::new());
        assert!(matches!(source.fetch(), Err(SymbolError::Unavailable(_))));
    }
}
