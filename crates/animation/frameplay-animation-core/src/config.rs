//! Core configuration for frameplay-animation-core.

use serde::{Deserialize, Serialize};

/// Logical frame rate used by controllers and instances.
pub const DEFAULT_FRAME_RATE: f32 = 60.0;
/// Weights at or below this value are treated as zero.
pub const NEGLIGIBLE_WEIGHT: f32 = 5e-3;
/// Minimum accumulated override weight before the rest pose fills in.
pub const DEFAULT_BLEND_THRESHOLD: f32 = 0.05;
/// Offset added to seek targets so the floor lands on the requested frame.
pub const FORCED_FRAME_EPSILON: f32 = 1e-4;

/// Playback tuning shared by a controller and everything it drives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frames per second for time/frame conversion.
    pub frame_rate: f32,
    /// Direct controllers zero all weights when the desired sum is at or below this.
    pub negligible_weight: f32,
    /// Skeletal mixer rest pose threshold.
    pub blend_threshold: f32,
    pub forced_frame_epsilon: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            negligible_weight: NEGLIGIBLE_WEIGHT,
            blend_threshold: DEFAULT_BLEND_THRESHOLD,
            forced_frame_epsilon: FORCED_FRAME_EPSILON,
        }
    }
}

impl Config {
    /// Duration of one logical frame in seconds.
    #[inline]
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate
    }
}
