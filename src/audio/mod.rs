//! Audio input, spectrum analysis and feature extraction.
//!
//! Everything upstream of the feature set: sample feeds (WAV file, procedural
//! synth, live capture), the byte spectrum analyser that turns samples into
//! frequency snapshots, and the session object that owns them.

mod analyzer;
mod features;
mod feed;
#[cfg(feature = "live-input")]
mod live;
mod session;

use thiserror::Error;

pub use analyzer::{hann_window, SpectrumAnalyzer};
pub use features::FeatureExtractor;
pub use feed::{FeedStatus, SampleFeed, SynthFeed, WavFeed, DEMO_COMPOSITION};
#[cfg(feature = "live-input")]
pub use live::LiveFeed;
pub use session::AudioSession;

/// One analysis frame: a byte magnitude per frequency bin
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencySnapshot {
    bins: Vec<u8>,
}

impl FrequencySnapshot {
    /// Create a zeroed snapshot with a fixed bin count
    pub fn zeroed(bin_count: usize) -> Self {
        Self {
            bins: vec![0; bin_count],
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Magnitude at `bin`, or 0 past the end
    pub fn bin(&self, bin: usize) -> u8 {
        self.bins.get(bin).copied().unwrap_or(0)
    }

    pub(crate) fn bins_mut(&mut self) -> &mut [u8] {
        &mut self.bins
    }
}

impl From<Vec<u8>> for FrequencySnapshot {
    fn from(bins: Vec<u8>) -> Self {
        Self { bins }
    }
}

/// Named scalar features, each in raw magnitude units [0, 255]
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FeatureSet {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub average: f32,
}

impl FeatureSet {
    pub const ZERO: Self = Self {
        bass: 0.0,
        mid: 0.0,
        treble: 0.0,
        average: 0.0,
    };
}

/// Errors raised while opening an audio source
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read WAV file: {0}")]
    Wav(#[from] hound::Error),

    #[error("WAV file has no audio channels")]
    NoChannels,

    #[error("synth engine failed: {0}")]
    Synth(String),

    #[error("no audio input device found")]
    NoInputDevice,

    #[error("audio device error: {0}")]
    Device(String),

    #[error("invalid analyser config: {0}")]
    Config(#[from] crate::params::ConfigError),
}
