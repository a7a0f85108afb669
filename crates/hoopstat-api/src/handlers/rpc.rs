//! RPC-style procedure endpoint.
//!
//! `POST /api/trpc/:procedure` with the procedure input as the JSON body.
//! Replies use an envelope: `{"result":{"data":...}}` on success and
//! `{"error":{"message","code","httpStatus","data"}}` on failure, with the
//! HTTP status of the mapped error.

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;

use crate::context::RequestScope;
use crate::error::ApiError;
use crate::handlers::shot_detection::{DetectShotsBody, FALLBACK_HEADER};
use crate::state::AppState;

pub const DETECT_SHOTS: &str = "shotDetection.detectShots";

#[derive(Serialize)]
struct RpcSuccess<T: Serialize> {
    result: RpcData<T>,
}

#[derive(Serialize)]
struct RpcData<T: Serialize> {
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcErrorBody {
    message: String,
    code: &'static str,
    http_status: u16,
    data: serde_json::Value,
}

/// Procedure error code for an HTTP status.
fn rpc_code(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "BAD_REQUEST",
        404 => "NOT_FOUND",
        499 => "CLIENT_CLOSED_REQUEST",
        502 => "BAD_GATEWAY",
        503 => "SERVICE_UNAVAILABLE",
        504 => "GATEWAY_TIMEOUT",
        _ => "INTERNAL_SERVER_ERROR",
    }
}

fn rpc_error(err: ApiError) -> Response {
    let status = err.status_code();
    let body = RpcErrorBody {
        message: err.detail(),
        code: rpc_code(status),
        http_status: status.as_u16(),
        data: json!({
            "kind": err.code(),
            "upstreamStatus": err.upstream_status(),
        }),
    };
    (status, Json(json!({ "error": body }))).into_response()
}

fn parse_error(message: String) -> Response {
    let body = RpcErrorBody {
        message,
        code: "PARSE_ERROR",
        http_status: StatusCode::BAD_REQUEST.as_u16(),
        data: serde_json::Value::Null,
    };
    (StatusCode::BAD_REQUEST, Json(json!({ "error": body }))).into_response()
}

/// Dispatch a procedure call.
pub async fn call_procedure(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
    RequestScope(ctx): RequestScope,
    body: Bytes,
) -> Response {
    match procedure.as_str() {
        DETECT_SHOTS => {
            let input: DetectShotsBody = match serde_json::from_slice(&body) {
                Ok(input) => input,
                Err(e) => return parse_error(format!("Invalid input JSON: {}", e)),
            };
            let request = match input.into_request() {
                Ok(request) => request,
                Err(e) => return rpc_error(e),
            };
            match state.detection.detect(&ctx, request).await {
                Ok(detection) => {
                    let placeholder = detection.is_placeholder();
                    let mut response = Json(RpcSuccess {
                        result: RpcData {
                            data: detection.result,
                        },
                    })
                    .into_response();
                    if placeholder {
                        response
                            .headers_mut()
                            .insert(FALLBACK_HEADER, HeaderValue::from_static("true"));
                    }
                    response
                }
                Err(e) => rpc_error(e),
            }
        }
        other => rpc_error(ApiError::not_found(format!("No procedure named '{}'", other))),
    }
}
