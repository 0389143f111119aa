//! Page metadata fetching for newly created links.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Title stored when a page has no `<title>` element.
pub const UNTITLED: &str = "Untitled";

/// Errors raised while fetching a page.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
}

/// Fetches the title of a destination page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Downloads `url` and extracts its title.
    async fn fetch_title(&self, url: &str) -> Result<String, MetadataError>;
}

/// [`MetadataFetcher`] backed by `reqwest` with a fixed request timeout.
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

impl HttpMetadataFetcher {
    /// Builds a fetcher whose requests are aborted after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("snaplink/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch_title(&self, url: &str) -> Result<String, MetadataError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let title = extract_title(&body);
        debug!(url = %url, title = %title, "Fetched page title");

        Ok(title)
    }
}

/// Extracts the text of the first `<title>` element, case-insensitively.
///
/// Returns [`UNTITLED`] if the element is missing or unterminated.
pub fn extract_title(html: &str) -> String {
    const OPEN: &str = "<title>";
    const CLOSE: &str = "</title>";

    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();

    let Some(start) = lower.find(OPEN).map(|i| i + OPEN.len()) else {
        return UNTITLED.to_string();
    };
    let Some(len) = lower[start..].find(CLOSE) else {
        return UNTITLED.to_string();
    };

    html[start..start + len].trim().to_string()
}
