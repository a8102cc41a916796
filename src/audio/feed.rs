//! Sample feeds: where the analysed audio comes from.

use glicol::Engine;
use std::path::Path;

use super::AudioError;

/// Glicol block size (samples per engine block)
const BLOCK_SIZE: usize = 128;

/// Glicol composition for the built-in demo signal (procedural music code)
pub const DEMO_COMPOSITION: &str = r#"
~gate: speed 2.0 >> seq 60 _60 _~a 48
~a: choose 48 48 48 72 0 0 0
~amp: ~gate >> envperc 0.001 0.1
~pit: ~gate >> mul 261.63
~lead: saw ~pit >> mul ~amp >> lpf ~mod 5.0 >> mul 0.1
~mod: sin 0.2 >> mul 1300 >> add 1500
~kick: speed 4.0 >> seq 60 >> bd 0.2 >> mul 0.6
o: mix ~lead ~kick >> plate 0.1
"#;

/// Outcome of reading one tick's worth of samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Window filled with the latest samples
    Ready,
    /// No samples available yet (device still warming up)
    Pending,
    /// Source exhausted; playback should stop
    Ended,
}

/// Mono sample source polled once per tick
pub trait SampleFeed {
    /// Sample rate of the produced samples (Hz)
    fn sample_rate(&self) -> u32;

    /// Advance playback by `dt_s` seconds and copy the most recent
    /// `window.len()` samples into `window`
    fn read(&mut self, dt_s: f32, window: &mut [f32]) -> FeedStatus;

    /// Playback position (seconds since the feed started)
    fn position_s(&self) -> f32;

    /// Short human-readable label for logs
    fn describe(&self) -> String;
}

/// Copy the `window.len()` samples ending at `end` into `window`, zero-padding
/// whatever precedes the start of `samples`
fn copy_tail(samples: &[f32], end: usize, window: &mut [f32]) {
    let end = end.min(samples.len());
    let start = end.saturating_sub(window.len());
    let available = end - start;
    let pad = window.len() - available;

    window[..pad].fill(0.0);
    window[pad..].copy_from_slice(&samples[start..end]);
}

/// Convert a tick duration into a whole number of samples, carrying the
/// fractional remainder into the next tick
fn samples_for(dt_s: f32, sample_rate: u32, carry: &mut f64) -> u64 {
    let exact = dt_s.max(0.0) as f64 * sample_rate as f64 + *carry;
    let whole = exact.floor();
    *carry = exact - whole;
    whole as u64
}

/// Pre-decoded mono audio played back at tick rate
pub struct WavFeed {
    samples: Vec<f32>,
    sample_rate: u32,
    cursor: usize,
    carry: f64,
    label: String,
}

impl WavFeed {
    /// Decode a WAV file, mixing all channels down to mono
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(AudioError::NoChannels);
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        tracing::info!(
            "Decoded {}: {} Hz, {} channel(s), {:.1}s",
            path.display(),
            spec.sample_rate,
            channels,
            samples.len() as f32 / spec.sample_rate as f32
        );

        let mut feed = Self::from_samples(samples, spec.sample_rate);
        feed.label = format!("wav:{}", path.display());
        Ok(feed)
    }

    /// Play back an in-memory mono buffer
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            cursor: 0,
            carry: 0.0,
            label: "buffer".to_string(),
        }
    }

    /// Duration of the decoded audio (seconds)
    pub fn duration_s(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

impl SampleFeed for WavFeed {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, dt_s: f32, window: &mut [f32]) -> FeedStatus {
        let step = samples_for(dt_s, self.sample_rate, &mut self.carry) as usize;
        self.cursor = self.cursor.saturating_add(step);

        if self.cursor >= self.samples.len() {
            self.cursor = self.samples.len();
            return FeedStatus::Ended;
        }

        copy_tail(&self.samples, self.cursor, window);
        FeedStatus::Ready
    }

    fn position_s(&self) -> f32 {
        self.cursor as f32 / self.sample_rate as f32
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Procedural music rendered on demand by a Glicol engine
pub struct SynthFeed {
    engine: Engine<BLOCK_SIZE>,
    sample_rate: u32,
    /// Rendered samples starting at absolute index `buffer_start`
    buffer: Vec<f32>,
    buffer_start: u64,
    consumed: u64,
    carry: f64,
    /// Stop after this many samples (None = endless)
    limit: Option<u64>,
}

impl SynthFeed {
    /// Compile `code` into a Glicol engine running at `sample_rate`
    pub fn new(sample_rate: u32, code: &str, duration_s: Option<f32>) -> Result<Self, AudioError> {
        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(sample_rate as usize);
        engine.update_with_code(code);
        engine
            .update()
            .map_err(|e| AudioError::Synth(format!("{:?}", e)))?;

        Ok(Self {
            engine,
            sample_rate,
            buffer: Vec::new(),
            buffer_start: 0,
            consumed: 0,
            carry: 0.0,
            limit: duration_s.map(|d| (d.max(0.0) as f64 * sample_rate as f64) as u64),
        })
    }

    /// The built-in demo composition at 44.1 kHz
    pub fn demo(duration_s: Option<f32>) -> Result<Self, AudioError> {
        Self::new(44_100, DEMO_COMPOSITION, duration_s)
    }

    fn render_block(&mut self) {
        let (buffers, _) = self.engine.next_block(vec![]);
        for i in 0..BLOCK_SIZE {
            // Hard clip, mirrors the playback limiter
            self.buffer.push(buffers[0][i].clamp(-1.0, 1.0));
        }
    }
}

impl SampleFeed for SynthFeed {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, dt_s: f32, window: &mut [f32]) -> FeedStatus {
        self.consumed += samples_for(dt_s, self.sample_rate, &mut self.carry);

        if let Some(limit) = self.limit {
            if self.consumed >= limit {
                return FeedStatus::Ended;
            }
        }

        while self.buffer_start + (self.buffer.len() as u64) < self.consumed {
            self.render_block();
        }

        let end = (self.consumed - self.buffer_start) as usize;
        copy_tail(&self.buffer, end, window);

        // Keep only what the next window can still reach
        let keep_from = end.saturating_sub(window.len());
        self.buffer.drain(..keep_from);
        self.buffer_start += keep_from as u64;

        FeedStatus::Ready
    }

    fn position_s(&self) -> f32 {
        self.consumed as f32 / self.sample_rate as f32
    }

    fn describe(&self) -> String {
        format!("synth@{}Hz", self.sample_rate)
    }
}
