//! Ticker universe scraped from the S&P 500 constituents table.
//!
//! The Wikipedia page carries a `table#constituents` whose first column is the
//! ticker symbol. Row order is kept as published.

use super::http::{build_client, fetch_text};
use super::provider::{ProviderError, TickerSource};
use crate::config::UniverseConfig;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Scrapes the constituents table of a Wikipedia list page.
pub struct WikipediaUniverse {
    client: Client,
    url: String,
}

impl WikipediaUniverse {
    pub fn new(config: &UniverseConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.request_timeout_secs)?,
            url: config.url.clone(),
        })
    }
}

impl TickerSource for WikipediaUniverse {
    fn name(&self) -> &str {
        "wikipedia_sp500"
    }

    fn fetch_tickers(&self) -> Result<Vec<String>, ProviderError> {
        debug!(url = %self.url, "fetching constituents page");
        let html = fetch_text(&self.client, &self.url)?;
        let tickers = parse_constituents(&html);
        if tickers.is_empty() {
            warn!(url = %self.url, "constituents table not found or empty");
        }
        Ok(tickers)
    }
}

/// First-cell text of every body row of `table#constituents`.
///
/// Empty when the table is absent. Rows without a `td` (the header) are skipped.
pub fn parse_constituents(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table#constituents"),
        Selector::parse("tr"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    let Some(table) = document.select(&table_sel).next() else {
        return Vec::new();
    };

    table
        .select(&row_sel)
        .filter_map(|row| row.select(&cell_sel).next())
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .filter(|ticker| !ticker.is_empty())
        .collect()
}
