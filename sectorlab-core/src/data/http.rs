//! Blocking HTTP helpers shared by the scrapers and the API client.

use super::provider::ProviderError;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Browser user agent; some sites refuse the default reqwest one.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

/// Build a client with a browser user agent and an optional request timeout.
///
/// Without a timeout the transport default applies.
pub fn build_client(timeout_secs: Option<u64>) -> Result<Client, ProviderError> {
    let mut builder = Client::builder().user_agent(BROWSER_USER_AGENT);
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {e}")))
}

/// GET a page and return its body. Non-2xx statuses are errors.
pub fn fetch_text(client: &Client, url: &str) -> Result<String, ProviderError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| ProviderError::NetworkUnreachable(format!("{url}: {e}")))?;

    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ProviderError::AuthenticationRequired(format!(
            "{url} requires authentication"
        )));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited {
            retry_after_secs: retry_after(&resp),
        });
    }
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    resp.text()
        .map_err(|e| ProviderError::ResponseFormatChanged(format!("{url}: unreadable body: {e}")))
}

/// Seconds from a `retry-after` header, 60 when absent.
pub fn retry_after(resp: &reqwest::blocking::Response) -> u64 {
    resp.headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
