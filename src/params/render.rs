//! Projection and run-loop configuration.

use serde::Deserialize;

use super::{require_positive, ConfigError};

/// Projection handed to the renderer alongside the camera pose
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Viewport width (pixels)
    pub viewport_width: u32,

    /// Viewport height (pixels)
    pub viewport_height: u32,

    /// Vertical field of view (degrees)
    /// tuned value: 75
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            fov_degrees: 75.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::invalid(
                "render.viewport",
                "viewport dimensions must be non-zero",
            ));
        }
        require_positive("render.fov_degrees", self.fov_degrees)?;
        require_positive("render.near_plane", self.near_plane)?;
        require_positive("render.far_plane - near_plane", self.far_plane - self.near_plane)
    }
}

/// Headless run-loop settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Display refresh rate (ticks per second)
    pub fps: u32,

    /// Log a frame summary every N ticks
    pub log_every: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            log_every: 60,
        }
    }
}

impl RunConfig {
    /// Duration of one tick (seconds)
    pub fn tick_s(&self) -> f32 {
        1.0 / self.fps as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::invalid("run.fps", "must be > 0"));
        }
        if self.log_every == 0 {
            return Err(ConfigError::invalid("run.log_every", "must be > 0"));
        }
        Ok(())
    }
}
