//! url-feed backend client
//!
//! Submits a video URL for resolution (`POST /url-feed/seeurl`) and probes
//! the HLS manifest for readiness (`GET /hls/stream.m3u8`). Stream
//! preparation on the backend is asynchronous relative to the submit call,
//! hence the separate readiness probe.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{SubmitOutcome, SEEURL_PATH, STREAM_MANIFEST_PATH};

/// url-feed API error types
#[derive(Error, Debug)]
pub enum UrlFeedError {
    #[error("Backend rejected the URL")]
    Rejected,

    #[error("Backend returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Request body for the resolve endpoint
#[derive(Debug, Serialize)]
struct SeeUrlRequest<'a> {
    url: &'a str,
}

/// Response body of the resolve endpoint
#[derive(Debug, Deserialize)]
struct SeeUrlResponse {
    success: bool,
    #[serde(default)]
    thumb_url: Option<String>,
}

impl SeeUrlResponse {
    fn into_outcome(self) -> Result<SubmitOutcome, UrlFeedError> {
        if self.success {
            Ok(SubmitOutcome {
                thumb_url: self.thumb_url,
            })
        } else {
            Err(UrlFeedError::Rejected)
        }
    }
}

/// url-feed backend client
#[derive(Clone)]
pub struct UrlFeedClient {
    base_url: String,
    client: reqwest::Client,
}

impl UrlFeedClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// The backend base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the HLS manifest; doubles as the playback source
    pub fn stream_url(&self) -> String {
        format!("{}{}", self.base_url, STREAM_MANIFEST_PATH)
    }

    /// Submit a video URL for resolution
    ///
    /// A reachable backend answering `success: false` and a transport error
    /// are both terminal for the current attempt; callers map either to the
    /// same state transition.
    pub async fn submit(&self, url: &str) -> Result<SubmitOutcome, UrlFeedError> {
        let endpoint = format!("{}{}", self.base_url, SEEURL_PATH);

        let response = self
            .client
            .post(&endpoint)
            .json(&SeeUrlRequest { url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UrlFeedError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: SeeUrlResponse = serde_json::from_str(&body)
            .map_err(|e| UrlFeedError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        parsed.into_outcome()
    }

    /// Probe the manifest for readiness
    ///
    /// Any 2xx means the stream is ready. Non-2xx and network errors both
    /// read as "not yet" - routine while polling, never fatal.
    pub async fn stream_ready(&self) -> bool {
        match self.client.get(self.stream_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "readiness probe errored");
                false
            }
        }
    }
}
