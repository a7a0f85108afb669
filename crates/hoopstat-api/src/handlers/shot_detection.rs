//! Shot detection handlers.
//!
//! Two inbound shapes reach the same pipeline:
//! - `POST /api/shot-detection` with a JSON body (`videoUrl`, or a base64
//!   `video` plus `filename`)
//! - `POST /api/shot-detection/upload` with a multipart form whose `video`
//!   part is the file

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use hoopstat_detector::Detection;
use hoopstat_models::{DetectShotsRequest, InputError};
use serde::Deserialize;

use crate::context::RequestScope;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Set to `true` when the body is the placeholder result.
pub const FALLBACK_HEADER: &str = "X-Detection-Fallback";

/// JSON detection request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectShotsBody {
    /// Remote location of the video
    #[serde(default)]
    pub video_url: Option<String>,
    /// Base64-encoded video bytes
    #[serde(default)]
    pub video: Option<String>,
    /// Display filename for an inline video
    #[serde(default)]
    pub filename: Option<String>,
}

impl DetectShotsBody {
    pub fn into_request(self) -> ApiResult<DetectShotsRequest> {
        let video = self
            .video
            .map(|encoded| {
                STANDARD
                    .decode(encoded.trim())
                    .map(Bytes::from)
                    .map_err(|e| InputError::InvalidPayload(format!("video is not valid base64: {}", e)))
            })
            .transpose()?;

        Ok(DetectShotsRequest {
            video_url: self.video_url,
            video,
            filename: self.filename,
        })
    }
}

/// Build the HTTP response for a finished detection.
pub fn detection_response(detection: Detection) -> Response {
    let placeholder = detection.is_placeholder();
    let mut response = Json(detection.result).into_response();
    if placeholder {
        response
            .headers_mut()
            .insert(FALLBACK_HEADER, HeaderValue::from_static("true"));
    }
    response
}

/// `POST /api/shot-detection`
pub async fn detect_shots(
    State(state): State<AppState>,
    RequestScope(ctx): RequestScope,
    body: Result<Json<DetectShotsBody>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let request = body.into_request()?;
    let detection = state.detection.detect(&ctx, request).await?;
    Ok(detection_response(detection))
}

/// `POST /api/shot-detection/upload`
pub async fn upload_video(
    State(state): State<AppState>,
    RequestScope(ctx): RequestScope,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mut multipart = multipart?;
    let mut request = DetectShotsRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("video") => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    return Err(InputError::InvalidPayload(
                        "video must be sent as a file".to_string(),
                    )
                    .into());
                };
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read video: {}", e)))?;
                request.video = Some(data);
                request.filename = Some(filename);
            }
            Some("videoUrl") => {
                let url = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read videoUrl: {}", e)))?;
                request.video_url = Some(url);
            }
            _ => {}
        }
    }

    let detection = state.detection.detect(&ctx, request).await?;
    Ok(detection_response(detection))
}
