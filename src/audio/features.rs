//! Stateless per-tick feature extraction.

use super::{FeatureSet, FrequencySnapshot};
use crate::params::FeatureConfig;

/// Reads fixed bins and the spectrum mean out of a frequency snapshot
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Extract features from one snapshot
    ///
    /// Bins past the end of the snapshot read as 0, and an empty snapshot
    /// yields all zeros.
    pub fn extract(&self, snapshot: &FrequencySnapshot) -> FeatureSet {
        if snapshot.is_empty() {
            return FeatureSet::ZERO;
        }

        let sum: u32 = snapshot.as_slice().iter().map(|&b| b as u32).sum();

        FeatureSet {
            bass: snapshot.bin(self.config.bass_bin) as f32,
            mid: snapshot.bin(self.config.mid_bin) as f32,
            treble: snapshot.bin(self.config.treble_bin) as f32,
            average: sum as f32 / snapshot.len() as f32,
        }
    }
}
