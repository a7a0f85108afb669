//! Detection pipeline error types.

use hoopstat_models::InputError;
use thiserror::Error;

pub type DetectorResult<T> = Result<T, DetectorError>;

#[derive(Debug, Clone, Error)]
pub enum DetectorError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Failed to fetch video: {message}")]
    UpstreamFetch {
        status: Option<u16>,
        message: String,
        timed_out: bool,
    },

    #[error("Failed to detect shots: {message}")]
    DetectionService {
        status: Option<u16>,
        message: String,
        timed_out: bool,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl DetectorError {
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Video host failure for a transport-level error.
    pub(crate) fn fetch_failed(err: &reqwest::Error) -> Self {
        Self::UpstreamFetch {
            status: err.status().map(|s| s.as_u16()),
            message: describe(err),
            timed_out: err.is_timeout(),
        }
    }

    /// Video host failure for a response with a bad status.
    pub(crate) fn fetch_status(status: reqwest::StatusCode) -> Self {
        Self::UpstreamFetch {
            status: Some(status.as_u16()),
            message: format!("video host returned {}", status),
            timed_out: false,
        }
    }

    /// Detection service failure for a transport-level error.
    pub(crate) fn service_failed(err: &reqwest::Error) -> Self {
        Self::DetectionService {
            status: err.status().map(|s| s.as_u16()),
            message: describe(err),
            timed_out: err.is_timeout(),
        }
    }

    /// Stable identifier for logs, metrics and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DetectorError::InvalidInput(_) => "invalid_input",
            DetectorError::UpstreamFetch { .. } => "upstream_fetch",
            DetectorError::DetectionService { .. } => "detection_service",
            DetectorError::Unexpected(_) => "unexpected",
            DetectorError::Cancelled => "cancelled",
        }
    }

    /// HTTP status reported by the failing upstream, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DetectorError::UpstreamFetch { status, .. }
            | DetectorError::DetectionService { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DetectorError::UpstreamFetch { timed_out: true, .. }
                | DetectorError::DetectionService { timed_out: true, .. }
        )
    }

    /// Whether the placeholder fallback may stand in for this error.
    ///
    /// Invalid input always reaches the caller, and a cancelled request has
    /// nobody left to answer.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            DetectorError::UpstreamFetch { .. }
                | DetectorError::DetectionService { .. }
                | DetectorError::Unexpected(_)
        )
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}
