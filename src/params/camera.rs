//! Camera journey configuration: the looping path and travel rates.

use serde::Deserialize;

use super::{require_positive, ConfigError};

/// Camera journey parameters (spline path + feature-driven travel)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraJourney {
    /// Spline control points (world units), visited in order
    pub control_points: Vec<[f32; 3]>,

    /// Whether the path loops from the last control point back to the first
    pub closed: bool,

    /// Base travel per tick (fraction of the path length)
    /// 0.0005 = one lap every ~33 s at 60 Hz
    pub speed: f32,

    /// Feature divisor: travel += feature / feature_divisor each tick
    pub feature_divisor: f32,

    /// Look-at distance ahead of the camera (fraction of the path length)
    pub lookahead: f32,

    /// Exponential blend toward the sampled position per tick (1 = snap)
    pub smoothing: f32,
}

impl Default for CameraJourney {
    fn default() -> Self {
        Self {
            // Slow orbit around the blob, bobbing above and below its equator
            control_points: vec![
                [5.0, 0.0, 0.0],
                [3.5, 1.2, 3.5],
                [0.0, 0.4, 5.5],
                [-3.5, -1.0, 3.5],
                [-5.0, 0.0, 0.0],
                [-3.5, 1.0, -3.5],
                [0.0, -0.4, -5.5],
                [3.5, -1.2, -3.5],
            ],
            closed: true,
            speed: 0.0005,
            feature_divisor: 256_000.0,
            lookahead: 0.01,
            smoothing: 0.12,
        }
    }
}

impl CameraJourney {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_points.is_empty() {
            return Err(ConfigError::invalid(
                "camera.control_points",
                "at least one control point is required",
            ));
        }
        require_positive("camera.feature_divisor", self.feature_divisor)?;
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::invalid(
                "camera.smoothing",
                format!("must be in (0, 1], got {}", self.smoothing),
            ));
        }
        if !self.speed.is_finite() || !self.lookahead.is_finite() {
            return Err(ConfigError::invalid(
                "camera.speed",
                "speed and lookahead must be finite",
            ));
        }
        Ok(())
    }
}
