//! Client for the external shot-detection service.
//!
//! This crate provides:
//! - An HTTP client that submits a video to the detection service as a
//!   multipart upload
//! - A fetcher that downloads a video from a caller-supplied URL
//! - The submission pipeline tying both together, including the optional
//!   placeholder fallback
//!
//! The detection algorithm itself runs out of process; this crate only moves
//! bytes and shapes JSON.

pub mod client;
pub mod context;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod pipeline;
pub mod types;

pub use client::{DetectorClient, DetectorClientConfig};
pub use context::RequestContext;
pub use error::{DetectorError, DetectorResult};
pub use fetch::{FetchConfig, VideoFetcher};
pub use pipeline::{Detection, DetectionConfig, DetectionPipeline};
