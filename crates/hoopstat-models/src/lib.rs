//! Shared data models for the Hoopstat shot-detection API.
//!
//! This crate provides Serde-serializable types for:
//! - Detection results and shot events returned by the detection service
//! - The video source sum type (remote URL or direct upload)
//! - The loose inbound request shape and its validation

pub mod detection;
pub mod error;
pub mod source;

// Re-export common types
pub use detection::{DetectionResult, ShotEvent};
pub use error::{InputError, InputResult};
pub use source::{DetectShotsRequest, VideoSource, MAX_FILENAME_LENGTH, MAX_URL_LENGTH, UPLOAD_FILENAME};
