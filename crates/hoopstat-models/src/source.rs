//! Video source for a detection request.
//!
//! A request names its video either by URL or by uploading the bytes
//! directly. [`VideoSource`] holds exactly one of the two; the loose
//! [`DetectShotsRequest`] shape filled in by the HTTP layer is converted
//! into it with `TryFrom`, which is where the exactly-one-of rule lives.

use std::fmt;

use bytes::Bytes;
use url::Url;
use validator::Validate;

use crate::error::{InputError, InputResult};

/// Maximum accepted URL length.
pub const MAX_URL_LENGTH: usize = 2048;

/// Filename every payload is submitted under, whatever the caller called it.
pub const UPLOAD_FILENAME: &str = "video.mp4";

/// Longest display filename kept from an upload, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Where the video for a detection request comes from.
#[derive(Clone, PartialEq)]
pub enum VideoSource {
    /// Fetch the video from a remote location first
    ByUrl(Url),
    /// Video bytes supplied with the request
    ByUpload { video: Bytes, filename: String },
}

impl VideoSource {
    /// Build a URL source, checking syntax and scheme.
    pub fn from_url(raw: &str) -> InputResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InputError::invalid_url("URL cannot be empty"));
        }
        if raw.len() > MAX_URL_LENGTH {
            return Err(InputError::invalid_url(format!(
                "URL exceeds maximum length of {} characters",
                MAX_URL_LENGTH
            )));
        }

        let url = Url::parse(raw).map_err(|e| InputError::invalid_url(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(InputError::invalid_url(format!(
                    "unsupported protocol '{}', only http and https are allowed",
                    scheme
                )))
            }
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(InputError::invalid_url("URL must have a host"));
        }

        Ok(Self::ByUrl(url))
    }

    /// Build an upload source. An empty payload is rejected.
    ///
    /// The filename is display-only: it is trimmed, cut to
    /// [`MAX_FILENAME_LENGTH`] characters and defaults to [`UPLOAD_FILENAME`].
    pub fn from_upload(video: impl Into<Bytes>, filename: Option<String>) -> InputResult<Self> {
        let video = video.into();
        if video.is_empty() {
            return Err(InputError::EmptyUpload);
        }

        let filename = filename
            .map(|f| f.trim().chars().take(MAX_FILENAME_LENGTH).collect::<String>())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| UPLOAD_FILENAME.to_string());

        Ok(Self::ByUpload { video, filename })
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            VideoSource::ByUrl(_) => "url",
            VideoSource::ByUpload { .. } => "upload",
        }
    }
}

impl fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::ByUrl(url) => f.debug_tuple("ByUrl").field(&url.as_str()).finish(),
            VideoSource::ByUpload { video, filename } => f
                .debug_struct("ByUpload")
                .field("bytes", &video.len())
                .field("filename", filename)
                .finish(),
        }
    }
}

/// Inbound detection request as it arrives over the wire.
///
/// Every field is optional here; conversion into [`VideoSource`] decides
/// whether the combination is acceptable.
#[derive(Clone, Default, Validate)]
pub struct DetectShotsRequest {
    #[validate(url)]
    pub video_url: Option<String>,
    pub video: Option<Bytes>,
    /// Display name of an uploaded video; never rejected
    pub filename: Option<String>,
}

impl DetectShotsRequest {
    pub fn by_url(url: impl Into<String>) -> Self {
        Self {
            video_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn by_upload(video: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            video: Some(video.into()),
            filename: Some(filename.into()),
            ..Default::default()
        }
    }
}

impl fmt::Debug for DetectShotsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectShotsRequest")
            .field("video_url", &self.video_url)
            .field("video_bytes", &self.video.as_ref().map(Bytes::len))
            .field("filename", &self.filename)
            .finish()
    }
}

impl TryFrom<DetectShotsRequest> for VideoSource {
    type Error = InputError;

    fn try_from(request: DetectShotsRequest) -> InputResult<Self> {
        if let Err(errors) = request.validate() {
            if errors.field_errors().contains_key("video_url") {
                return Err(InputError::invalid_url("not a valid URL"));
            }
        }

        match (request.video_url, request.video) {
            (Some(_), Some(_)) => Err(InputError::BothSourcesProvided),
            (None, None) => Err(InputError::NoSourceProvided),
            (Some(url), None) => VideoSource::from_url(&url),
            (None, Some(video)) => VideoSource::from_upload(video, request.filename),
        }
    }
}
