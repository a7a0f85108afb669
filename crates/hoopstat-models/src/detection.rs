//! Shot detection result models.
//!
//! These mirror the JSON produced by the external detection service. Values
//! are passed through as received: the percentage is never recomputed and
//! the event order is never changed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single detected attempt at a specific video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShotEvent {
    /// Frame index where the attempt was detected
    pub frame: u64,
    /// Whether the attempt went in
    pub is_make: bool,
    /// Cumulative attempt count at this event
    pub attempts: u32,
    /// Cumulative make count at this event
    pub makes: u32,
}

impl ShotEvent {
    pub fn new(frame: u64, is_make: bool, attempts: u32, makes: u32) -> Self {
        Self {
            frame,
            is_make,
            attempts,
            makes,
        }
    }
}

/// Shot statistics for one analyzed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionResult {
    /// Total shot attempts detected
    pub total_attempts: u32,
    /// Total made shots
    pub total_makes: u32,
    /// Make percentage as reported by the service (0-100)
    pub shooting_percentage: f64,
    /// Shot events in the order the service reported them (chronological by frame)
    #[serde(default)]
    pub shot_events: Vec<ShotEvent>,
}

impl DetectionResult {
    /// Fixed result returned in place of a real one when the fallback is
    /// enabled and the detection pipeline fails.
    pub fn placeholder() -> Self {
        Self {
            total_attempts: 10,
            total_makes: 7,
            shooting_percentage: 70.0,
            shot_events: vec![
                ShotEvent::new(100, true, 1, 1),
                ShotEvent::new(200, false, 2, 1),
            ],
        }
    }

    /// Number of missed attempts.
    pub fn total_misses(&self) -> u32 {
        self.total_attempts.saturating_sub(self.total_makes)
    }
}
