//! Axum HTTP API server.
//!
//! This crate provides:
//! - REST and RPC-style shot-detection endpoints (URL or file upload)
//! - Health, readiness and service info endpoints
//! - Request id, logging and security headers middleware
//! - Prometheus metrics

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use context::{RequestId, RequestScope};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::DetectionService;
pub use state::AppState;
