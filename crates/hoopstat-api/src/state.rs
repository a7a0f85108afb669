//! Application state.

use std::sync::Arc;

use hoopstat_detector::DetectionPipeline;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::services::DetectionService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub detection: DetectionService,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let pipeline = DetectionPipeline::new(config.detection.clone())?;

        Ok(Self {
            config,
            detection: DetectionService::new(Arc::new(pipeline)),
        })
    }
}
