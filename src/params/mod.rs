//! Parameter definitions with documented units and semantics.
//!
//! All tuned constants live here with:
//! - Units (seconds, Hz, per-tick increments, raw 0-255 feature units)
//! - Documented ranges and meanings
//! - A TOML representation (every field optional, defaults fill the gaps)

mod audio;
mod camera;
mod deform;
mod modulation;
mod render;
mod trigger;

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub use audio::{AnalyzerConfig, FeatureConfig};
pub use camera::CameraJourney;
pub use deform::DeformParams;
pub use modulation::{IdleMotion, ModulationParams};
pub use render::{RenderConfig, RunConfig};
pub use trigger::TriggerParams;

use crate::cues::Cue;

/// Errors raised while loading or validating a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub features: FeatureConfig,
    pub deform: DeformParams,
    pub camera: CameraJourney,
    pub modulation: ModulationParams,
    pub idle: IdleMotion,
    pub trigger: TriggerParams,
    pub render: RenderConfig,
    pub run: RunConfig,
    pub cues: Vec<Cue>,
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer.validate()?;
        self.deform.validate()?;
        self.camera.validate()?;
        self.modulation.validate()?;
        self.render.validate()?;
        self.run.validate()?;
        self.trigger.validate()?;
        require_finite("idle.rotation_y_rate", self.idle.rotation_y_rate)?;

        if let Some(cue) = self.cues.iter().find(|c| !c.time_s.is_finite()) {
            return Err(ConfigError::invalid(
                "cues.time_s",
                format!("cue '{}' has a non-finite time", cue.text),
            ));
        }
        Ok(())
    }
}

/// Reject NaN and infinities, which TOML accepts as floats
fn require_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {}", value)))
    }
}

/// Shared check for divisors used in affine feature mappings
fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {}", value)))
    }
}
