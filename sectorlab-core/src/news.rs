//! News headline scraping.
//!
//! Each source is a named site URL. The CSS selector for its headlines is
//! looked up by host name; a host without a known selector yields nothing.
//! Sources are fetched independently so one broken site does not affect the
//! others.

use crate::config::NewsConfig;
use crate::data::http::{build_client, fetch_text};
use crate::data::provider::{HeadlineSource, HeadlineSummarizer, ProviderError};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A site to pull headlines from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsSource {
    pub name: String,
    pub url: String,
}

impl NewsSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Financial, tech, sports and entertainment front pages.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("financial", "https://www.ft.com/us"),
            Self::new("tech", "https://www.wired.com"),
            Self::new("sports", "https://www.skysports.com/"),
            Self::new("entertainment", "https://www.tmz.com"),
        ]
    }

    /// Host part of the URL (`https://www.ft.com/us` → `www.ft.com`).
    pub fn host(&self) -> Option<&str> {
        let rest = self.url.split_once("://").map_or(self.url.as_str(), |(_, r)| r);
        rest.split(['/', '?', '#'])
            .next()
            .filter(|h| !h.is_empty())
    }
}

/// Headline selector for a supported host.
pub fn headline_selector(host: &str) -> Option<&'static str> {
    match host {
        "www.ft.com" => Some(".js-teaser-heading-link"),
        "www.wired.com" => Some(".summary-item__hed"),
        "www.skysports.com" => Some(".sdc-site-tile__headline-link"),
        "www.tmz.com" => Some(".article__header-title"),
        _ => None,
    }
}

/// Strip `!?.,`, fold line breaks and runs of whitespace into single spaces.
pub fn clean_headline(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '!' | '?' | '.' | ','))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Up to `limit` cleaned headlines matching `selector`, in document order.
pub fn extract_headlines(html: &str, selector: &str, limit: usize) -> Result<Vec<String>, ProviderError> {
    let selector = Selector::parse(selector)
        .map_err(|e| ProviderError::Other(format!("invalid selector '{selector}': {e}")))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .take(limit)
        .map(|el| clean_headline(&el.text().collect::<String>()))
        .collect())
}

/// Scrapes headlines over HTTP.
pub struct HtmlHeadlineSource {
    client: Client,
    per_source: usize,
}

impl HtmlHeadlineSource {
    pub fn new(config: &NewsConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.request_timeout_secs)?,
            per_source: config.headlines_per_source,
        })
    }
}

impl HeadlineSource for HtmlHeadlineSource {
    fn fetch_headlines(&self, source: &NewsSource) -> Result<Vec<String>, ProviderError> {
        let host = source.host().unwrap_or_default();
        let Some(selector) = headline_selector(host) else {
            warn!(source = %source.name, host, "unsupported URL for domain");
            return Ok(Vec::new());
        };

        let html = fetch_text(&self.client, &source.url)?;
        extract_headlines(&html, selector, self.per_source)
    }
}

/// Gather headlines from every source; failing sources are logged and skipped.
pub fn collect_headlines(fetcher: &dyn HeadlineSource, sources: &[NewsSource]) -> Vec<String> {
    let mut all = Vec::new();
    for source in sources {
        match fetcher.fetch_headlines(source) {
            Ok(headlines) => {
                info!(source = %source.name, count = headlines.len(), "fetched headlines");
                all.extend(headlines);
            }
            Err(e) => {
                warn!(source = %source.name, error = %e, "failed to fetch headlines");
            }
        }
    }
    all
}

/// Collect headlines and summarize them in one request.
///
/// Fails with [`ProviderError::NoHeadlines`] when every source came back empty
/// or failed; the summarizer is not called in that case.
pub fn summarize_news(
    fetcher: &dyn HeadlineSource,
    summarizer: &dyn HeadlineSummarizer,
    sources: &[NewsSource],
) -> Result<String, ProviderError> {
    let headlines = collect_headlines(fetcher, sources);
    if headlines.is_empty() {
        return Err(ProviderError::NoHeadlines {
            sources: sources.len(),
        });
    }
    summarizer.summarize(&headlines)
}
