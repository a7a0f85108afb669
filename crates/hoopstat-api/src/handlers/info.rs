//! Service information handlers.

use axum::response::Redirect;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub rpc: &'static str,
    pub shot_detection: &'static str,
    pub shot_detection_upload: &'static str,
    pub health: &'static str,
    pub ready: &'static str,
}

/// `GET /` sends callers to the API description.
pub async fn root() -> Redirect {
    Redirect::temporary("/api")
}

/// `GET /api`
pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            rpc: "/api/trpc",
            shot_detection: "/api/shot-detection",
            shot_detection_upload: "/api/shot-detection/upload",
            health: "/health",
            ready: "/ready",
        },
    })
}
