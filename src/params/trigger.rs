//! Alert trigger threshold.

use serde::Deserialize;

use super::{require_finite, ConfigError};

/// Threshold for the Normal/Alert trigger (raw bass units, 0-255)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriggerParams {
    /// Alert while the driving feature is strictly above this value
    /// tuned value: 210
    pub threshold: f32,
}

impl Default for TriggerParams {
    fn default() -> Self {
        Self { threshold: 210.0 }
    }
}

impl TriggerParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("trigger.threshold", self.threshold)
    }
}
