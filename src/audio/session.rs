//! Audio session: the explicit owner of the feed, analyser and transport state.

use super::analyzer::SpectrumAnalyzer;
use super::feed::{FeedStatus, SampleFeed};
use super::{AudioError, FrequencySnapshot};
use crate::params::AnalyzerConfig;

/// A running audio source plus its analyser
///
/// Created when playback starts and dropped (via [`AudioSession::stop`]) when
/// it ends. Poll once per tick; `None` means no snapshot is available this
/// tick and the caller should fall back to idle motion.
pub struct AudioSession {
    feed: Box<dyn SampleFeed>,
    analyzer: SpectrumAnalyzer,
    window: Vec<f32>,
    snapshot: FrequencySnapshot,
    playing: bool,
    ended: bool,
}

impl AudioSession {
    /// Start a session on `feed`; playback begins immediately
    pub fn start(
        feed: Box<dyn SampleFeed>,
        analyzer_config: AnalyzerConfig,
    ) -> Result<Self, AudioError> {
        let analyzer = SpectrumAnalyzer::new(analyzer_config)?;

        tracing::info!(
            "Audio session started: {} ({} bins)",
            feed.describe(),
            analyzer.bin_count()
        );

        Ok(Self {
            window: vec![0.0; analyzer.fft_size()],
            snapshot: FrequencySnapshot::zeroed(analyzer.bin_count()),
            feed,
            analyzer,
            playing: true,
            ended: false,
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the feed has run out of samples
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Resume playback (no effect once the feed has ended)
    pub fn play(&mut self) {
        if !self.ended && !self.playing {
            tracing::info!("Playback resumed at {:.2}s", self.position_s());
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        if self.playing {
            tracing::info!("Playback paused at {:.2}s", self.position_s());
            self.playing = false;
        }
    }

    /// Flip between playing and paused; returns the new playing state
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    /// Playback position of the underlying feed (seconds)
    pub fn position_s(&self) -> f32 {
        self.feed.position_s()
    }

    /// Drop analyser smoothing so the next snapshot starts from silence
    pub fn reset_analysis(&mut self) {
        self.analyzer.reset();
    }

    /// Advance the feed by `dt_s` and analyse the latest window
    pub fn poll(&mut self, dt_s: f32) -> Option<&FrequencySnapshot> {
        if !self.playing {
            return None;
        }

        match self.feed.read(dt_s, &mut self.window) {
            FeedStatus::Ready => {
                self.analyzer.analyze(&self.window, &mut self.snapshot);
                Some(&self.snapshot)
            }
            FeedStatus::Pending => {
                tracing::debug!("Audio feed has no samples yet");
                None
            }
            FeedStatus::Ended => {
                tracing::info!(
                    "Audio feed {} ended at {:.2}s",
                    self.feed.describe(),
                    self.position_s()
                );
                self.ended = true;
                self.playing = false;
                None
            }
        }
    }

    /// Tear the session down, releasing the feed (and any device stream)
    pub fn stop(self) {
        tracing::info!(
            "Audio session stopped: {} at {:.2}s",
            self.feed.describe(),
            self.position_s()
        );
    }
}
