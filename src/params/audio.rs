//! Spectrum analysis configuration and feature bin selection.

use serde::Deserialize;

use super::{require_positive, ConfigError};

/// Byte spectrum analyser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// FFT window size (must be power of 2, produces fft_size / 2 bins)
    /// tuned value: 256 (= 128 bins)
    pub fft_size: usize,

    /// Exponential smoothing between consecutive analyses (0 = none, <1)
    /// tuned value: 0.8
    pub smoothing: f32,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_db: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_db: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl AnalyzerConfig {
    /// Number of magnitude bins in each snapshot
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(ConfigError::invalid(
                "analyzer.fft_size",
                format!("must be a power of 2 >= 32, got {}", self.fft_size),
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::invalid(
                "analyzer.smoothing",
                format!("must be in [0, 1), got {}", self.smoothing),
            ));
        }
        require_positive("analyzer.max_db - min_db", self.max_db - self.min_db)
    }
}

/// Which spectrum bins feed the named features
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Low-end bin (not DC)
    /// tuned value: 2 (~344 Hz wide bins at 44.1 kHz / 256)
    pub bass_bin: usize,

    /// Mid-spectrum bin
    pub mid_bin: usize,

    /// High-spectrum bin (reads as 0 when past the snapshot end)
    pub treble_bin: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            bass_bin: 2,
            mid_bin: 32,
            treble_bin: 96,
        }
    }
}
