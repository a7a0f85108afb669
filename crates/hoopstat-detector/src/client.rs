//! Detection service HTTP client.

use std::time::Duration;

use bytes::Bytes;
use hoopstat_models::{DetectionResult, UPLOAD_FILENAME};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{DetectorError, DetectorResult};
use crate::types::HealthResponse;

/// Path of the detection endpoint on the service.
const DETECT_PATH: &str = "/detect-shots";

/// Name of the multipart field carrying the video.
pub const VIDEO_FIELD: &str = "video";

/// Configuration for the detection client.
#[derive(Debug, Clone)]
pub struct DetectorClientConfig {
    /// Base URL of the detection service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DetectorClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(300), // 5 minutes for video analysis
        }
    }
}

impl DetectorClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("DETECTION_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeout: Duration::from_secs(
                std::env::var("DETECTION_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Client for the shot-detection service.
pub struct DetectorClient {
    http: Client,
    config: DetectorClientConfig,
}

impl DetectorClient {
    /// Create a new detection client.
    pub fn new(config: DetectorClientConfig) -> DetectorResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DetectorError::unexpected(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> DetectorResult<Self> {
        Self::new(DetectorClientConfig::from_env())
    }

    /// Check if the detection service is healthy.
    pub async fn health_check(&self) -> DetectorResult<bool> {
        let url = self.config.endpoint("/health");

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response
                    .json()
                    .await
                    .map_err(|e| DetectorError::service_failed(&e))?;
                Ok(health.is_healthy())
            }
            Ok(response) => {
                warn!("Detection service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Detection service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Submit a video and return the service's statistics as-is.
    ///
    /// The payload always goes out as the `video` multipart field named
    /// `video.mp4`. Exactly one POST is made; failures are not retried.
    pub async fn detect(&self, video: Bytes) -> DetectorResult<DetectionResult> {
        let url = self.config.endpoint(DETECT_PATH);
        let size = video.len() as u64;

        debug!(bytes = size, "Submitting video to {}", url);

        let part = Part::stream_with_length(video, size)
            .file_name(UPLOAD_FILENAME)
            .mime_str("video/mp4")
            .map_err(|e| DetectorError::unexpected(format!("invalid multipart part: {}", e)))?;
        let form = Form::new().part(VIDEO_FIELD, part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DetectorError::service_failed(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectorError::DetectionService {
                status: Some(status.as_u16()),
                message: if body.is_empty() {
                    format!("detection service returned {}", status)
                } else {
                    format!("detection service returned {}: {}", status, body)
                },
                timed_out: false,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DetectorError::service_failed(&e))?;

        serde_json::from_slice(&body).map_err(|e| DetectorError::DetectionService {
            status: Some(status.as_u16()),
            message: format!("invalid response body: {}", e),
            timed_out: false,
        })
    }
}
