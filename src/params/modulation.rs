//! Feature-to-appearance mapping constants.

use serde::Deserialize;

use super::{require_positive, ConfigError};

/// Mapping from features to color, lighting, opacity, rotation and scale
///
/// Each mapping is affine in one feature (raw 0-255 units):
/// `value = base + feature / divisor` (or `* gain` where noted).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModulationParams {
    /// Hue cycles per second of wall-clock time
    pub hue_cycle_hz: f32,

    /// Hue offset at treble = 255 (fraction of the color wheel)
    pub hue_feature_shift: f32,

    /// Saturation at mid = 0
    pub saturation_base: f32,

    /// Saturation added at mid = 255
    pub saturation_gain: f32,

    /// Lightness = bass / lightness_divisor
    /// tuned value: 512
    pub lightness_divisor: f32,

    /// Opacity at average = 0
    pub opacity_base: f32,

    /// Opacity += average / opacity_divisor
    pub opacity_divisor: f32,

    /// Light intensity at average = 0
    pub light_base: f32,

    /// Light intensity += average / light_divisor
    pub light_divisor: f32,

    /// Rotation about X per tick (radians)
    /// tuned value: 0.005
    pub rotation_x_rate: f32,

    /// Rotation about Y per tick at silence (radians)
    /// tuned value: 0.01
    pub rotation_y_rate: f32,

    /// Rotation about Y per tick += average / rotation_divisor
    /// tuned value: 1000
    pub rotation_divisor: f32,

    /// Uniform scale = 1 + average / scale_divisor
    /// tuned value: 150
    pub scale_divisor: f32,
}

impl Default for ModulationParams {
    fn default() -> Self {
        Self {
            hue_cycle_hz: 0.05,
            hue_feature_shift: 0.15,
            saturation_base: 0.6,
            saturation_gain: 0.4,
            lightness_divisor: 512.0,
            opacity_base: 0.4,
            opacity_divisor: 200.0,
            light_base: 1.0,
            light_divisor: 128.0,
            rotation_x_rate: 0.005,
            rotation_y_rate: 0.01,
            rotation_divisor: 1000.0,
            scale_divisor: 150.0,
        }
    }
}

impl ModulationParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("modulation.lightness_divisor", self.lightness_divisor)?;
        require_positive("modulation.opacity_divisor", self.opacity_divisor)?;
        require_positive("modulation.light_divisor", self.light_divisor)?;
        require_positive("modulation.rotation_divisor", self.rotation_divisor)?;
        require_positive("modulation.scale_divisor", self.scale_divisor)?;
        if !self.hue_cycle_hz.is_finite() || !self.hue_feature_shift.is_finite() {
            return Err(ConfigError::invalid(
                "modulation.hue_cycle_hz",
                "hue rates must be finite",
            ));
        }
        Ok(())
    }
}

/// Motion applied while audio is paused or not yet available
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdleMotion {
    /// Rotation about Y per tick (radians)
    /// tuned value: 0.002
    pub rotation_y_rate: f32,
}

impl Default for IdleMotion {
    fn default() -> Self {
        Self {
            rotation_y_rate: 0.002,
        }
    }
}
