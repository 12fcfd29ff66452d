use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::FetchFailure;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Source of raw page HTML. One GET per call, no retries.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure>;
}

/// Fetches pages over HTTPS with browser-like headers and caching disabled.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_str(&settings.accept_language)
                .context("Invalid accept_language setting")?,
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers);
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(HttpFetcher { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "Fetch failed");
                return Err(FetchFailure::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Fetch returned non-success status");
            return Err(FetchFailure::Status(status.as_u16()));
        }

        match response.text().await {
            Ok(body) => {
                debug!(url, bytes = body.len(), "Fetched page");
                Ok(body)
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to read response body");
                Err(FetchFailure::Transport(e.to_string()))
            }
        }
    }
}
