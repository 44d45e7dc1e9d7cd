//! Index constituents scraped from a public reference page.
//!
//! The page is expected to hold the constituents in its first HTML table with
//! the ticker in the first data column (the layout of the S&P 500 list on
//! Wikipedia). Only the first `sample_size` symbols are kept.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{normalize_symbols, SymbolError, SymbolSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexPageConfig {
    pub url: String,
    pub sample_size: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for IndexPageConfig {
    fn default() -> Self {
        Self {
            url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies".into(),
            sample_size: 50,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .into(),
        }
    }
}

/// Scrapes the constituent table of a market index page.
pub struct IndexConstituentsSource {
    config: IndexPageConfig,
    excluded: Vec<String>,
}

impl IndexConstituentsSource {
    pub fn new(config: IndexPageConfig, excluded: Vec<String>) -> Self {
        Self { config, excluded }
    }

    fn download(&self) -> Result<String, SymbolError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .user_agent(self.config.user_agent.clone())
            .build()
            .map_err(|e| SymbolError::Request(e.to_string()))?;

        let resp = client
            .get(&self.config.url)
            .send()
            .map_err(|e| SymbolError::Request(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SymbolError::Request(format!(
                "HTTP {status} from {}",
                self.config.url
            )));
        }
        resp.text().map_err(|e| SymbolError::Request(e.to_string()))
    }
}

impl SymbolSource for IndexConstituentsSource {
    fn name(&self) -> &str {
        "index_constituents"
    }

    fn fetch(&self) -> Result<Vec<String>, SymbolError> {
        let html = self.download()?;
        let all = parse_constituent_table(&html)?;
        let sample = all.into_iter().take(self.config.sample_size);
        Ok(normalize_symbols(sample, &self.excluded))
    }
}

/// First-column cell text of every data row (`<td>`) in the first `<table>`.
///
/// Header rows made of `<th>` cells are skipped.
pub fn parse_constituent_table(html: &str) -> Result<Vec<String>, SymbolError> {
    let lower = html.to_ascii_lowercase();
    let start = lower
        .find("<table")
        .ok_or_else(|| SymbolError::Parse("no table found".into()))?;
    let end = lower[start..]
        .find("</table>")
        .map(|i| start + i)
        .unwrap_or(lower.len());
    let table = &html[start..end];
    let table_lower = &lower[start..end];

    let mut symbols = Vec::new();
    let mut cursor = 0;
    while let Some(row_off) = table_lower[cursor..].find("<tr") {
        let row_start = cursor + row_off;
        let row_end = table_lower[row_start..]
            .find("</tr>")
            .map(|i| row_start + i)
            .unwrap_or(table_lower.len());
        let row = &table[row_start..row_end];
        let row_lower = &table_lower[row_start..row_end];
        if let Some(cell) = first_data_cell(row, row_lower).filter(|c| !c.is_empty()) {
            symbols.push(cell);
        }
        cursor = row_end.max(row_start + 3);
    }

    if symbols.is_empty() {
        return Err(SymbolError::Parse("table has no data rows".into()));
    }
    Ok(symbols)
}

fn first_data_cell(row: &str, row_lower: &str) -> Option<String> {
    let open = row_lower.find("<td")?;
    let content_start = open + row_lower[open..].find('>')? + 1;
    let content_end = row_lower[content_start..]
        .find("</td>")
        .map(|i| content_start + i)
        .unwrap_or(row.len());
    Some(decode_entities(&strip_tags(&row[content_start..content_end])).trim().to_string())
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
