//! HTTP fetching behind a small trait.
//!
//! Every pipeline talks to the network through [`FetchAsync`], so tests can
//! substitute an in-memory implementation.
//!
//! - [`HttpFetcher`]: reqwest-backed implementation with a descriptive
//!   `User-Agent` and an optional timeout
//! - [`fetch_or_empty`]: the best-effort wrapper used by the sitemap crawler,
//!   which turns any failure into empty content plus a warning
//!
//! There is no retry or backoff; a failed request is reported once.

use crate::config::HttpConfig;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Anything that can GET a URL and hand back the body as text.
pub trait FetchAsync {
    /// Fetch `url`. Transport failures and non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// reqwest-backed [`FetchAsync`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client carrying the configured user agent and timeout.
    pub fn new(config: &HttpConfig) -> Result<Self, Box<dyn Error>> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Fetched"
        );
        Ok(body)
    }
}

/// Fetch `url`, logging and returning an empty string on any failure.
#[instrument(level = "debug", skip(fetcher))]
pub async fn fetch_or_empty<F: FetchAsync>(fetcher: &F, url: &str) -> String {
    match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(%url, error = %e, "Fetch failed; continuing with empty content");
            String::new()
        }
    }
}
