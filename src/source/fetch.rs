//! Retrieving raw feed bodies.
//!
//! [`FeedFetcher`] is the seam between the pipeline and the network, so tests
//! can substitute canned responses.  [`HttpFetcher`] is the real
//! implementation: one plain GET per call, no retries, no caching, no
//! conditional requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;

/// Upper bound on a single feed request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can turn a feed URL into its body text.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches feeds over HTTP with [`reqwest`].
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(%url, "fetching feed");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        // Decoded with the Content-Type charset, UTF-8 when none is given.
        // Bytes invalid in that charset become U+FFFD.
        Ok(response.text().await?)
    }
}
