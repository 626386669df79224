//! OpenSky states fetcher — one authenticated GET per poll.

use std::time::Duration;

use thiserror::Error;

use loiter_core::config::{BoundingBox, Credentials};
use loiter_core::states::{parse_states, Snapshot};
use loiter_core::types::LoiterError;

pub const DEFAULT_API_URL: &str = "https://opensky-network.org/api/states/all";

/// Why a poll produced no snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("unusable response: {0}")]
    Parse(#[from] LoiterError),
}

/// Anything that can produce one snapshot per call.
#[async_trait::async_trait]
pub trait StateSource {
    async fn poll(&self) -> Result<Snapshot, FetchError>;
}

/// HTTP client for `/states/all` over a fixed bounding box.
pub struct OpenSkyClient {
    client: reqwest::Client,
    url: String,
    bbox: BoundingBox,
    credentials: Credentials,
}

impl OpenSkyClient {
    pub fn new(
        url: &str,
        bbox: BoundingBox,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("loiter-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(OpenSkyClient {
            client,
            url: url.to_string(),
            bbox,
            credentials,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl StateSource for OpenSkyClient {
    async fn poll(&self) -> Result<Snapshot, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .query(&self.bbox.query())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = resp.text().await?;
        Ok(parse_states(&body)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
