//! Rest-shape generation and deformation constants.

use serde::Deserialize;

use super::{require_finite, require_positive, ConfigError};

/// Deformation and base mesh parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeformParams {
    /// Spatial frequency `k` of the sine/cosine field (radians per world unit)
    pub spatial_frequency: f32,

    /// Damping `D`: intensity is divided by this before scaling the field
    /// 300 keeps |noise| <= 0.85 for byte features
    pub damping: f32,

    /// Rest sphere radius (world units)
    /// tuned value: 2.0
    pub radius: f32,

    /// Icosphere subdivision level (0 = icosahedron, 10 * 4^n + 2 vertices)
    pub detail: u32,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            spatial_frequency: 2.0,
            damping: 300.0,
            radius: 2.0,
            detail: 4,
        }
    }
}

impl DeformParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("deform.spatial_frequency", self.spatial_frequency)?;
        require_positive("deform.damping", self.damping)?;
        require_positive("deform.radius", self.radius)?;
        if self.detail > 7 {
            return Err(ConfigError::invalid(
                "deform.detail",
                format!("at most 7 subdivisions supported, got {}", self.detail),
            ));
        }
        Ok(())
    }
}
