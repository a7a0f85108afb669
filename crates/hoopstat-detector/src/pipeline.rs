//! Video submission pipeline.
//!
//! Turns a [`VideoSource`] into one detection call:
//! 1. Resolve the payload (download it for URL sources, use it as-is for uploads)
//! 2. POST it to the detection service
//! 3. Return the service's statistics, or the placeholder result when the
//!    fallback is enabled and step 1 or 2 failed
//!
//! Each call is independent: nothing is cached or deduplicated, and both
//! outbound calls are attempted at most once.

use std::time::Instant;

use hoopstat_models::{DetectionResult, InputError, VideoSource};
use tracing::{debug, info, warn};

use crate::client::{DetectorClient, DetectorClientConfig};
use crate::context::RequestContext;
use crate::error::{DetectorError, DetectorResult};
use crate::fetch::{FetchConfig, VideoFetcher};
use crate::guard::restricted_host;

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct DetectionConfig {
    pub detector: DetectorClientConfig,
    pub fetch: FetchConfig,
    /// Substitute the placeholder result for upstream failures
    pub fallback_on_error: bool,
    /// Let URL sources point at loopback/private/metadata hosts
    pub allow_private_hosts: bool,
}

impl DetectionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            detector: DetectorClientConfig::from_env(),
            fetch: FetchConfig::from_env(),
            fallback_on_error: env_flag("DETECTION_FALLBACK_ENABLED"),
            allow_private_hosts: env_flag("ALLOW_PRIVATE_VIDEO_HOSTS"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct Detection {
    pub result: DetectionResult,
    /// Set when `result` is the placeholder standing in for this error
    pub fallback_reason: Option<DetectorError>,
}

impl Detection {
    fn detected(result: DetectionResult) -> Self {
        Self {
            result,
            fallback_reason: None,
        }
    }

    fn placeholder(reason: DetectorError) -> Self {
        Self {
            result: DetectionResult::placeholder(),
            fallback_reason: Some(reason),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Submits videos to the detection service.
pub struct DetectionPipeline {
    fetcher: VideoFetcher,
    client: DetectorClient,
    config: DetectionConfig,
}

impl DetectionPipeline {
    pub fn new(config: DetectionConfig) -> DetectorResult<Self> {
        Ok(Self {
            fetcher: VideoFetcher::new(config.fetch.clone())?,
            client: DetectorClient::new(config.detector.clone())?,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> DetectorResult<Self> {
        Self::new(DetectionConfig::from_env())
    }

    pub fn client(&self) -> &DetectorClient {
        &self.client
    }

    /// Submit a video for shot detection.
    ///
    /// Returns `Cancelled` as soon as the context is cancelled, dropping any
    /// in-flight request. Invalid input and cancellation are never replaced by
    /// the placeholder.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        source: VideoSource,
    ) -> DetectorResult<Detection> {
        let start = Instant::now();
        let kind = source.kind();

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(DetectorError::Cancelled),
            result = self.run(ctx, source) => result,
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                info!(
                    request_id = %ctx.request_id(),
                    source = kind,
                    attempts = result.total_attempts,
                    makes = result.total_makes,
                    misses = result.total_misses(),
                    elapsed_ms,
                    "Shot detection completed"
                );
                Ok(Detection::detected(result))
            }
            Err(err) if self.config.fallback_on_error && err.is_fallback_eligible() => {
                warn!(
                    request_id = %ctx.request_id(),
                    source = kind,
                    error_kind = err.kind(),
                    error = %err,
                    elapsed_ms,
                    "Shot detection failed, returning placeholder result"
                );
                Ok(Detection::placeholder(err))
            }
            Err(err) => {
                warn!(
                    request_id = %ctx.request_id(),
                    source = kind,
                    error_kind = err.kind(),
                    error = %err,
                    elapsed_ms,
                    "Shot detection failed"
                );
                Err(err)
            }
        }
    }

    async fn run(&self, ctx: &RequestContext, source: VideoSource) -> DetectorResult<DetectionResult> {
        let video = match source {
            VideoSource::ByUrl(url) => {
                if !self.config.allow_private_hosts {
                    if let Some(reason) = restricted_host(&url) {
                        return Err(InputError::invalid_url(reason).into());
                    }
                }
                self.fetcher.fetch(&url).await?
            }
            VideoSource::ByUpload { video, filename } => {
                debug!(
                    request_id = %ctx.request_id(),
                    filename = %filename,
                    bytes = video.len(),
                    "Using uploaded video"
                );
                video
            }
        };

        self.client.detect(video).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use hoopstat_models::DetectShotsRequest;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate, Times};

    use super::*;

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "total_attempts": 10,
            "total_makes": 7,
            "shooting_percentage": 70.0,
            "shot_events": [
                {"frame": 100, "is_make": true, "attempts": 1, "makes": 1}
            ]
        })
    }

    fn pipeline(detector: &MockServer, fallback_on_error: bool) -> DetectionPipeline {
        DetectionPipeline::new(DetectionConfig {
            detector: DetectorClientConfig {
                base_url: detector.uri(),
                timeout: Duration::from_secs(5),
            },
            fetch: FetchConfig {
                timeout: Duration::from_secs(5),
                ..Default::default()
            },
            fallback_on_error,
            allow_private_hosts: true,
        })
        .unwrap()
    }

    fn ctx() -> RequestContext {
        RequestContext::new("test-request")
    }

    fn upload() -> VideoSource {
        VideoSource::from_upload(Bytes::from_static(b"uploaded-video"), Some("clip.mov".into()))
            .unwrap()
    }

    async fn mount_detector(server: &MockServer, template: ResponseTemplate, expected: impl Into<Times>) {
        Mock::given(method("POST"))
            .and(path("/detect-shots"))
            .respond_with(template)
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_invalid_shape_never_reaches_service() {
        let server = MockServer::start().await;
        mount_detector(&server, ResponseTemplate::new(200), 0).await;

        let both = DetectShotsRequest {
            video_url: Some(format!("{}/video.mp4", server.uri())),
            video: Some(Bytes::from_static(b"data")),
            filename: None,
        };
        let err = DetectorError::from(VideoSource::try_from(both).unwrap_err());
        assert_eq!(err.kind(), "invalid_input");

        let neither = VideoSource::try_from(DetectShotsRequest::default()).unwrap_err();
        assert_eq!(neither, InputError::NoSourceProvided);

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_url_source_passes_result_through() {
        let host = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/game.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"remote-video".to_vec()))
            .expect(1)
            .mount(&host)
            .await;

        let detector = MockServer::start().await;
        mount_detector(
            &detector,
            ResponseTemplate::new(200).set_body_json(sample_body()),
            1,
        )
        .await;

        let source = VideoSource::from_url(&format!("{}/game.mp4", host.uri())).unwrap();
        let detection = pipeline(&detector, false)
            .submit(&ctx(), source)
            .await
            .unwrap();

        assert!(!detection.is_placeholder());
        assert_eq!(serde_json::to_value(&detection.result).unwrap(), sample_body());

        let sent = detector.received_requests().await.unwrap();
        assert!(sent[0]
            .body
            .windows(b"remote-video".len())
            .any(|w| w == b"remote-video"));
    }

    #[tokio::test]
    async fn test_url_not_found_without_fallback() {
        let host = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&host)
            .await;

        let detector = MockServer::start().await;
        mount_detector(&detector, ResponseTemplate::new(200), 0).await;

        let source = VideoSource::from_url(&format!("{}/gone.mp4", host.uri())).unwrap();
        let err = pipeline(&detector, false)
            .submit(&ctx(), source)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DetectorError::UpstreamFetch {
                status: Some(404),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_single_multipart_post() {
        let detector = MockServer::start().await;
        mount_detector(
            &detector,
            ResponseTemplate::new(200).set_body_json(sample_body()),
            1,
        )
        .await;

        pipeline(&detector, false)
            .submit(&ctx(), upload())
            .await
            .unwrap();

        let sent = detector.received_requests().await.unwrap();
        assert_eq!(sent.len(), 1);
        let body = String::from_utf8_lossy(&sent[0].body);
        assert!(body.contains("name=\"video\""));
        assert!(body.contains("filename=\"video.mp4\""));
        assert!(!body.contains("clip.mov"));
        assert!(body.contains("uploaded-video"));
    }

    #[tokio::test]
    async fn test_fallback_replaces_service_failure() {
        let detector = MockServer::start().await;
        mount_detector(&detector, ResponseTemplate::new(503), 1).await;

        let detection = pipeline(&detector, true)
            .submit(&ctx(), upload())
            .await
            .unwrap();

        assert!(detection.is_placeholder());
        assert_eq!(detection.result, DetectionResult::placeholder());
        assert_eq!(
            detection.fallback_reason.as_ref().map(DetectorError::kind),
            Some("detection_service")
        );
    }

    #[tokio::test]
    async fn test_fallback_replaces_fetch_failure() {
        let host = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&host)
            .await;
        let detector = MockServer::start().await;
        mount_detector(&detector, ResponseTemplate::new(200), 0).await;

        let source = VideoSource::from_url(&format!("{}/gone.mp4", host.uri())).unwrap();
        let detection = pipeline(&detector, true)
            .submit(&ctx(), source)
            .await
            .unwrap();

        assert_eq!(detection.result, DetectionResult::placeholder());
    }

    #[tokio::test]
    async fn test_service_error_surfaces_without_fallback() {
        let detector = MockServer::start().await;
        mount_detector(&detector, ResponseTemplate::new(500), 1).await;

        let err = pipeline(&detector, false)
            .submit(&ctx(), upload())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "detection_service");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_repeated_uploads_are_not_deduplicated() {
        let detector = MockServer::start().await;
        mount_detector(
            &detector,
            ResponseTemplate::new(200).set_body_json(sample_body()),
            2,
        )
        .await;

        let pipeline = pipeline(&detector, false);
        pipeline.submit(&ctx(), upload()).await.unwrap();
        pipeline.submit(&ctx(), upload()).await.unwrap();
    }

    #[tokio::test]
    async fn test_detection_timeout() {
        let detector = MockServer::start().await;
        mount_detector(
            &detector,
            ResponseTemplate::new(200)
                .set_body_json(sample_body())
                .set_delay(Duration::from_secs(2)),
            1,
        )
        .await;

        let pipeline = DetectionPipeline::new(DetectionConfig {
            detector: DetectorClientConfig {
                base_url: detector.uri(),
                timeout: Duration::from_millis(100),
            },
            ..Default::default()
        })
        .unwrap();

        let err = pipeline.submit(&ctx(), upload()).await.unwrap_err();
        assert_eq!(err.kind(), "detection_service");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_fallback_replaces_detection_timeout() {
        let detector = MockServer::start().await;
        mount_detector(
            &detector,
            ResponseTemplate::new(200)
                .set_body_json(sample_body())
                .set_delay(Duration::from_secs(2)),
            1,
        )
        .await;

        let pipeline = DetectionPipeline::new(DetectionConfig {
            detector: DetectorClientConfig {
                base_url: detector.uri(),
                timeout: Duration::from_millis(100),
            },
            fallback_on_error: true,
            ..Default::default()
        })
        .unwrap();

        let detection = pipeline.submit(&ctx(), upload()).await.unwrap();
        assert_eq!(detection.result, DetectionResult::placeholder());
        let reason = detection.fallback_reason.unwrap();
        assert_eq!(reason.kind(), "detection_service");
        assert!(reason.is_timeout());
    }

    #[tokio::test]
    async fn test_fallback_replaces_fetch_timeout() {
        let host = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"remote-video".to_vec())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&host)
            .await;
        let detector = MockServer::start().await;
        mount_detector(&detector, ResponseTemplate::new(200), 0).await;

        let pipeline = DetectionPipeline::new(DetectionConfig {
            detector: DetectorClientConfig {
                base_url: detector.uri(),
                timeout: Duration::from_secs(5),
            },
            fetch: FetchConfig {
                timeout: Duration::from_millis(100),
                ..Default::default()
            },
            fallback_on_error: true,
            allow_private_hosts: true,
        })
        .unwrap();

        let source = VideoSource::from_url(&format!("{}/slow.mp4", host.uri())).unwrap();
        let detection = pipeline.submit(&ctx(), source).await.unwrap();
        assert_eq!(detection.result, DetectionResult::placeholder());
        let reason = detection.fallback_reason.unwrap();
        assert_eq!(reason.kind(), "upstream_fetch");
        assert!(reason.is_timeout());
    }

    #[tokio::test]
    async fn test_private_host_blocked_by_default() {
        let host = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&host)
            .await;

        let pipeline = DetectionPipeline::new(DetectionConfig {
            fallback_on_error: true,
            ..Default::default()
        })
        .unwrap();

        let source = VideoSource::from_url(&format!("{}/video.mp4", host.uri())).unwrap();
        let err = pipeline.submit(&ctx(), source).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let detector = MockServer::start().await;
        mount_detector(&detector, ResponseTemplate::new(200), 0).await;

        let ctx = ctx();
        ctx.cancel();
        let err = pipeline(&detector, true)
            .submit(&ctx, upload())
            .await
            .unwrap_err();
        assert!(matches!(err, DetectorError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let detector = MockServer::start().await;
        mount_detector(
            &detector,
            ResponseTemplate::new(200)
                .set_body_json(sample_body())
                .set_delay(Duration::from_secs(30)),
            0..=1,
        )
        .await;

        let ctx = ctx();
        let token = ctx.cancellation_token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        let start = Instant::now();
        let err = pipeline(&detector, true)
            .submit(&ctx, upload())
            .await
            .unwrap_err();
        assert!(matches!(err, DetectorError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
