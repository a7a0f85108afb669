//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "hoopstat_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "hoopstat_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "hoopstat_http_requests_in_flight";

    // Detection metrics
    pub const DETECTIONS_TOTAL: &str = "hoopstat_detections_total";
    pub const DETECTION_DURATION_SECONDS: &str = "hoopstat_detection_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a detection submission.
///
/// `source` is `url`, `upload` or `none`; `outcome` is `success`, `fallback`
/// or the error kind.
pub fn record_detection(source: &str, outcome: &str, duration_secs: f64) {
    let labels = [
        ("source", source.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!(names::DETECTIONS_TOTAL, &labels).increment(1);
    histogram!(names::DETECTION_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Metrics middleware for HTTP requests.
///
/// Labels by matched route template so path parameters don't explode
/// cardinality.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &route, status, duration);

    response
}
