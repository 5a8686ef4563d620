//! Collaborator traits and structured provider errors.
//!
//! The traits abstract over the external sources the cache and the news flow
//! depend on (constituents page, chat-completion API, news sites) so we can
//! swap implementations and mock them in tests.

use crate::news::NewsSource;
use thiserror::Error;

/// Structured error types for external provider calls.
///
/// These are designed to be displayable in CLI output.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("no headlines could be fetched from any of {sources} sources")]
    NoHeadlines { sources: usize },

    #[error("provider error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return ProviderError::HttpStatus {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if e.is_decode() {
            return ProviderError::ResponseFormatChanged(e.to_string());
        }
        ProviderError::NetworkUnreachable(e.to_string())
    }
}

/// Source of the ticker universe (e.g. the S&P 500 constituents table).
pub trait TickerSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the ordered ticker list. Empty when the expected table is absent.
    fn fetch_tickers(&self) -> Result<Vec<String>, ProviderError>;
}

/// Assigns a free-text sector label to a ticker.
pub trait SectorClassifier {
    fn classify(&self, ticker: &str) -> Result<String, ProviderError>;
}

/// Scrapes headlines from one news source.
pub trait HeadlineSource {
    fn fetch_headlines(&self, source: &NewsSource) -> Result<Vec<String>, ProviderError>;
}

/// Condenses a list of headlines into a free-text summary.
pub trait HeadlineSummarizer {
    fn summarize(&self, headlines: &[String]) -> Result<String, ProviderError>;
}

/// Progress callback for a classification refresh.
pub trait ClassifyProgress {
    /// Called once the ticker universe is known.
    fn on_start(&self, total: usize);

    /// Called after each ticker is classified.
    fn on_classified(&self, ticker: &str, sector: &str, index: usize, total: usize);

    /// Called when the new snapshot has been written.
    fn on_saved(&self, snapshot_name: &str);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl ClassifyProgress for StdoutProgress {
    fn on_start(&self, total: usize) {
        println!("Classifying {total} tickers...");
    }

    fn on_classified(&self, ticker: &str, sector: &str, _index: usize, _total: usize) {
        println!("{ticker}: {sector}");
    }

    fn on_saved(&self, snapshot_name: &str) {
        println!("Data saved to {snapshot_name}");
    }
}

/// Progress reporter that stays silent.
pub struct NoProgress;

impl ClassifyProgress for NoProgress {
    fn on_start(&self, _total: usize) {}

    fn on_classified(&self, _ticker: &str, _sector: &str, _index: usize, _total: usize) {}

    fn on_saved(&self, _snapshot_name: &str) {}
}
