//! Institutional banner API client
//!
//! Fetches the member institution label from the `/institutional_banner`
//! endpoint and folds every failure into a [`LookupResult`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::LookupResult;

/// Default site serving the banner endpoint
pub const DEFAULT_BASE_URL: &str = "https://arxiv.org";

/// Path of the banner endpoint, relative to the base URL
const BANNER_PATH: &str = "/institutional_banner";

/// Errors that can occur when fetching the banner label
#[derive(Debug, Error)]
pub enum BannerError {
    /// Transport-level failure (connection refused, DNS, timeout)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    Status(StatusCode),

    /// The server answered OK but the body had no usable label
    #[error("Malformed banner response: {0}")]
    Malformed(String),
}

impl BannerError {
    /// Whether this error should shorten the retry window
    ///
    /// A malformed body still means the server responded.
    pub fn is_lookup_failure(&self) -> bool {
        !matches!(self, BannerError::Malformed(_))
    }
}

/// Response body of the banner endpoint
#[derive(Debug, Deserialize)]
struct BannerResponse {
    label: Option<String>,
}

/// Anything that can look up the institution label
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Performs one lookup. Never fails; failures are reported in the result.
    async fn lookup(&self) -> LookupResult;
}

/// Client for the institutional banner endpoint
#[derive(Debug, Clone)]
pub struct BannerClient {
    client: Client,
    base_url: String,
}

impl Default for BannerClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BannerClient {
    /// Create a new BannerClient against `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a new BannerClient with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Create a new BannerClient whose requests give up after `timeout`
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BannerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Full URL of the banner endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), BANNER_PATH)
    }

    /// Fetch the label
    ///
    /// # Returns
    /// * `Ok(Some(label))` - the endpoint returned a non-empty label
    /// * `Ok(None)` - the endpoint returned an empty label
    /// * `Err(BannerError)` - transport failure, bad status or malformed body
    pub async fn fetch_label(&self) -> Result<Option<String>, BannerError> {
        let response = self.client.get(self.endpoint()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BannerError::Status(status));
        }

        let text = response.text().await?;
        parse_banner(&text)
    }
}

/// Parses a banner response body
fn parse_banner(body: &str) -> Result<Option<String>, BannerError> {
    let parsed: BannerResponse =
        serde_json::from_str(body).map_err(|e| BannerError::Malformed(e.to_string()))?;

    match parsed.label {
        Some(label) if label.is_empty() => Ok(None),
        Some(label) => Ok(Some(label)),
        None => Err(BannerError::Malformed("missing label field".to_string())),
    }
}

#[async_trait]
impl LabelSource for BannerClient {
    async fn lookup(&self) -> LookupResult {
        match self.fetch_label().await {
            Ok(label) => LookupResult::found(label),
            Err(e) => {
                if e.is_lookup_failure() {
                    tracing::warn!(endpoint = %self.endpoint(), error = %e, "banner lookup failed");
                    LookupResult::failed()
                } else {
                    tracing::debug!(
                        endpoint = %self.endpoint(),
                        error = %e,
                        "banner response had no label"
                    );
                    LookupResult::found(None)
                }
            }
        }
    }
}

#[async_trait]
impl<S: LabelSource + ?Sized> LabelSource for std::sync::Arc<S> {
    async fn lookup(&self) -> LookupResult {
        (**self).lookup().await
    }
}
