//! Input validation errors.

use thiserror::Error;

/// Result type for request validation.
pub type InputResult<T> = Result<T, InputError>;

/// Reasons a detection request shape is rejected before any outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Provide either videoUrl or video, not both")]
    BothSourcesProvided,

    #[error("No video provided: expected videoUrl or a video file")]
    NoSourceProvided,

    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Uploaded video is empty")]
    EmptyUpload,

    #[error("Invalid video payload: {0}")]
    InvalidPayload(String),
}

impl InputError {
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }
}
