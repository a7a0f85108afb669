//! Video download for URL-mode requests.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{DetectorError, DetectorResult};

/// Configuration for the video fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for the whole download
    pub timeout: Duration,
    /// Largest body accepted from a video host
    pub max_video_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_video_bytes: 200 * 1024 * 1024, // 200MB
        }
    }
}

impl FetchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: std::env::var("VIDEO_FETCH_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_video_bytes: std::env::var("MAX_VIDEO_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_video_bytes),
        }
    }
}

/// Downloads videos from caller-supplied URLs.
pub struct VideoFetcher {
    http: Client,
    config: FetchConfig,
}

impl VideoFetcher {
    pub fn new(config: FetchConfig) -> DetectorResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DetectorError::unexpected(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// GET `url` and return the body.
    ///
    /// Any non-2xx status, transport error, timeout, or a body over
    /// `max_video_bytes` is an upstream fetch failure.
    pub async fn fetch(&self, url: &Url) -> DetectorResult<Bytes> {
        debug!(url = %url, "Fetching video");

        let mut response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DetectorError::fetch_failed(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectorError::fetch_status(status));
        }

        let limit = self.config.max_video_bytes;
        if let Some(length) = response.content_length() {
            if length > limit {
                return Err(too_large(limit));
            }
        }

        let mut body = BytesMut::with_capacity(
            response.content_length().unwrap_or(0).min(limit) as usize,
        );
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DetectorError::fetch_failed(&e))?
        {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(too_large(limit));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %url, bytes = body.len(), "Fetched video");
        Ok(body.freeze())
    }
}

fn too_large(limit: u64) -> DetectorError {
    DetectorError::UpstreamFetch {
        status: None,
        message: format!("video exceeds maximum size of {} bytes", limit),
        timed_out: false,
    }
}
