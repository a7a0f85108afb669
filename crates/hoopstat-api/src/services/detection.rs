//! Shot detection service.
//!
//! Shared by the REST and RPC handlers: validates the inbound shape, runs
//! the submission pipeline and records metrics for every outcome.

use std::sync::Arc;
use std::time::Instant;

use hoopstat_detector::{Detection, DetectionPipeline, DetectorError, RequestContext};
use hoopstat_models::{DetectShotsRequest, VideoSource};
use tracing::debug;

use crate::error::ApiResult;
use crate::metrics;

#[derive(Clone)]
pub struct DetectionService {
    pipeline: Arc<DetectionPipeline>,
}

impl DetectionService {
    pub fn new(pipeline: Arc<DetectionPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    /// Validate a request and submit it for detection.
    pub async fn detect(
        &self,
        ctx: &RequestContext,
        request: DetectShotsRequest,
    ) -> ApiResult<Detection> {
        let source = match VideoSource::try_from(request) {
            Ok(source) => source,
            Err(e) => {
                debug!(request_id = %ctx.request_id(), error = %e, "Rejected detection request");
                metrics::record_detection("none", "invalid_input", 0.0);
                return Err(DetectorError::from(e).into());
            }
        };

        let kind = source.kind();
        let start = Instant::now();
        let result = self.pipeline.submit(ctx, source).await;

        let outcome = match &result {
            Ok(detection) if detection.is_placeholder() => "fallback",
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_detection(kind, outcome, start.elapsed().as_secs_f64());

        Ok(result?)
    }
}
