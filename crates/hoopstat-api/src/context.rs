//! Request-scoped context extraction.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hoopstat_detector::RequestContext;
use uuid::Uuid;

/// Request id assigned by the request id middleware.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Extractor yielding the [`RequestContext`] for the current request.
///
/// The context lives as long as the handler future. A client disconnect
/// drops that future, and with it any outbound call still in flight, so the
/// HTTP path never cancels the token itself. The token is there for library
/// callers driving [`hoopstat_detector::DetectionPipeline`] directly.
#[derive(Debug, Clone)]
pub struct RequestScope(pub RequestContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate);

        Ok(Self(RequestContext::new(request_id.0)))
    }
}
