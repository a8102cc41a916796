//! Timed text cues (lyrics, captions) keyed to the playback position.

use serde::Deserialize;

/// A line of text that becomes active at `time_s`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cue {
    /// Playback position where the cue starts (seconds)
    pub time_s: f32,
    pub text: String,
}

impl Cue {
    pub fn new(time_s: f32, text: impl Into<String>) -> Self {
        Self {
            time_s,
            text: text.into(),
        }
    }
}

/// Cues sorted by start time
#[derive(Debug, Clone, Default)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    pub fn new(mut cues: Vec<Cue>) -> Self {
        // Stable: cues sharing a start time keep their listed order
        cues.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        Self { cues }
    }

    /// Index of the last cue starting at or before `position_s`
    pub fn index_at(&self, position_s: f32) -> Option<usize> {
        self.cues
            .partition_point(|c| c.time_s <= position_s)
            .checked_sub(1)
    }

    /// The last cue starting at or before `position_s`
    pub fn active_at(&self, position_s: f32) -> Option<&Cue> {
        self.index_at(position_s).map(|i| &self.cues[i])
    }
}

/// Tracks which cue is showing and reports changes only
#[derive(Debug, Clone, Default)]
pub struct CueCursor {
    track: CueTrack,
    current: Option<usize>,
}

impl CueCursor {
    pub fn new(track: CueTrack) -> Self {
        Self {
            track,
            current: None,
        }
    }

    /// Returns the newly active cue if it differs from the last one reported
    pub fn update(&mut self, position_s: f32) -> Option<&Cue> {
        let index = self.track.index_at(position_s)?;
        if self.current == Some(index) {
            return None;
        }
        self.current = Some(index);
        self.track.cues.get(index)
    }

    pub fn current(&self) -> Option<&Cue> {
        self.current.and_then(|i| self.track.cues.get(i))
    }
}
