//! Per-request context handed to every pipeline call.

use tokio_util::sync::CancellationToken;

/// Explicit request scope for a detection call.
///
/// Carries the request id used in logs and a cancellation token. Cancelling
/// the token aborts any in-flight outbound call for this request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Tie the request to an externally owned token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the request has been cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}
