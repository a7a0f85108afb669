//! API error types.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hoopstat_detector::DetectorError;
use hoopstat_models::InputError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Non-standard status used when the client went away mid-request.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Detection(#[from] DetectorError),
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        Self::Detection(DetectorError::InvalidInput(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl ApiError {
    /// Body extractor failure. Anything the server caused is internal, the
    /// rest is the caller's bad request.
    fn from_rejection(status: StatusCode, text: String) -> Self {
        if status.is_server_error() {
            Self::internal(text)
        } else {
            Self::bad_request(text)
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Detection(err) => match err {
                DetectorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
                DetectorError::UpstreamFetch { .. } | DetectorError::DetectionService { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                DetectorError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
                DetectorError::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                    .unwrap_or(StatusCode::BAD_REQUEST),
            },
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Detection(err) => match err {
                DetectorError::InvalidInput(_) => "INVALID_INPUT",
                DetectorError::UpstreamFetch { .. } => "UPSTREAM_FETCH_ERROR",
                DetectorError::DetectionService { .. } => "DETECTION_SERVICE_ERROR",
                DetectorError::Unexpected(_) => "UNEXPECTED_ERROR",
                DetectorError::Cancelled => "CLIENT_CLOSED_REQUEST",
            },
        }
    }

    /// Status reported by the failing upstream, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ApiError::Detection(err) => err.status(),
            _ => None,
        }
    }

    /// Message safe to return to the caller.
    pub fn detail(&self) -> String {
        // Don't expose internal error details in production
        let internal = matches!(
            self,
            ApiError::Internal(_) | ApiError::Detection(DetectorError::Unexpected(_))
        );
        if internal && std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.detail(),
            code: self.code(),
            upstream_status: self.upstream_status(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
