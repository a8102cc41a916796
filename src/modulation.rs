//! Feature-to-appearance mapping: color, light, opacity, rotation, scale.
//!
//! Every mapping is a fixed affine or periodic formula; values with a bounded
//! domain are clamped because features can exceed the mapping divisors.

use glam::Vec3;
use palette::{FromColor, Hsl, Srgb};

use crate::audio::FeatureSet;
use crate::params::ModulationParams;

/// Hue / saturation / lightness triple, each in [0, 1] (hue in [0, 1))
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ColorState {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl ColorState {
    /// Convert to sRGB-encoded RGB in [0, 1] (not linear light)
    pub fn to_rgb(&self) -> [f32; 3] {
        let hsl = Hsl::new(self.hue * 360.0, self.saturation, self.lightness);
        let rgb = Srgb::from_color(hsl);
        [rgb.red, rgb.green, rgb.blue]
    }
}

/// Appearance parameters for one tick
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Modulation {
    pub color: ColorState,
    /// Light intensity multiplier (>= 0)
    pub light_intensity: f32,
    pub opacity: f32,
    /// Euler rotation (radians) to add to the object this tick
    pub rotation_delta: Vec3,
    /// Uniform object scale
    pub scale: f32,
}

/// Stateless feature-to-appearance mapper
#[derive(Debug, Clone, Default)]
pub struct ModulationEngine {
    params: ModulationParams,
}

impl ModulationEngine {
    pub fn new(params: ModulationParams) -> Self {
        Self { params }
    }

    /// Map features and wall-clock time (seconds) to appearance
    pub fn evaluate(&self, features: &FeatureSet, time_s: f32) -> Modulation {
        let p = &self.params;

        let hue_phase = time_s * p.hue_cycle_hz + features.treble / 255.0 * p.hue_feature_shift;
        let hue = match hue_phase.rem_euclid(1.0) {
            h if h.is_finite() && h < 1.0 => h,
            _ => 0.0,
        };

        let color = ColorState {
            hue,
            saturation: unit(p.saturation_base + features.mid / 255.0 * p.saturation_gain),
            lightness: unit(features.bass / p.lightness_divisor),
        };

        Modulation {
            color,
            light_intensity: (p.light_base + features.average / p.light_divisor).max(0.0),
            opacity: unit(p.opacity_base + features.average / p.opacity_divisor),
            rotation_delta: Vec3::new(
                p.rotation_x_rate,
                p.rotation_y_rate + features.average / p.rotation_divisor,
                0.0,
            ),
            scale: 1.0 + features.average / p.scale_divisor,
        }
    }
}

/// Clamp into [0, 1], mapping NaN to 0
fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
