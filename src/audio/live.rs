//! Live capture from the default input device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::feed::{FeedStatus, SampleFeed};
use super::AudioError;

/// Samples kept per analysis window, as a multiple of the window length
const RETAIN_WINDOWS: usize = 4;

/// Upper bound on buffered capture, in seconds of audio
const MAX_BUFFERED_S: u32 = 1;

/// Microphone / loopback capture via cpal
pub struct LiveFeed {
    /// Mono samples written by the device callback
    captured: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    started: Instant,
    device_name: String,

    /// Input stream (kept alive)
    _stream: cpal::Stream,
}

impl LiveFeed {
    /// Open the default input device and start capturing
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::Device(format!("failed to get input config: {}", e)))?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        tracing::info!("Audio input: {} @ {}Hz", device_name, sample_rate);

        let captured = Arc::new(Mutex::new(Vec::<f32>::new()));
        let captured_clone = Arc::clone(&captured);
        let capacity = (sample_rate * MAX_BUFFERED_S) as usize;

        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = captured_clone.lock() {
                        push_mono(&mut buf, data, channels, capacity);
                    }
                },
                |err| tracing::error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::Device(format!("failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::Device(format!("failed to start input stream: {}", e)))?;

        Ok(Self {
            captured,
            sample_rate,
            started: Instant::now(),
            device_name,
            _stream: stream,
        })
    }
}

/// Append interleaved `data` as mono, then drop the oldest samples beyond
/// `capacity` (the buffer keeps filling while playback is paused)
fn push_mono(buf: &mut Vec<f32>, data: &[f32], channels: usize, capacity: usize) {
    buf.extend(
        data.chunks(channels.max(1))
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
    );
    if buf.len() > capacity {
        let excess = buf.len() - capacity;
        buf.drain(..excess);
    }
}

impl SampleFeed for LiveFeed {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, _dt_s: f32, window: &mut [f32]) -> FeedStatus {
        let Ok(mut buf) = self.captured.lock() else {
            return FeedStatus::Ended;
        };

        if buf.len() < window.len() {
            return FeedStatus::Pending;
        }

        let start = buf.len() - window.len();
        window.copy_from_slice(&buf[start..]);

        let retain = window.len() * RETAIN_WINDOWS;
        if buf.len() > retain {
            let excess = buf.len() - retain;
            buf.drain(..excess);
        }

        FeedStatus::Ready
    }

    fn position_s(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    fn describe(&self) -> String {
        format!("live:{}", self.device_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_mono_mixes_channels() {
        let mut buf = Vec::new();
        push_mono(&mut buf, &[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2, 16);
        assert_eq!(buf, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_push_mono_stays_bounded() {
        let capacity = 48_000;
        let block: Vec<f32> = (0..512).map(|i| i as f32).collect();
        let mut buf = Vec::new();

        // Several seconds of callbacks with nobody reading
        for _ in 0..1000 {
            push_mono(&mut buf, &block, 2, capacity);
            assert!(buf.len() <= capacity);
        }
        assert_eq!(buf.len(), capacity);

        // Newest samples are the ones kept
        assert_eq!(*buf.last().unwrap(), (510.0 + 511.0) / 2.0);
    }
}
