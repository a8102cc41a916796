//! Byte spectrum analyser built on rustfft.
//!
//! Produces one `FrequencySnapshot` per call: Hann-windowed FFT, magnitude
//! normalized by the window length, smoothed against the previous analysis,
//! converted to decibels and mapped linearly onto 0..=255.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use super::FrequencySnapshot;
use crate::params::{AnalyzerConfig, ConfigError};

/// FFT analyser that emits byte magnitude snapshots
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes carried between analyses
    smoothed: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Plan the FFT and precompute the window for `config`
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let window = (0..config.fft_size)
            .map(|i| hann_window(i, config.fft_size))
            .collect();

        Ok(Self {
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.bin_count()],
            scratch,
            window,
            fft,
            config,
        })
    }

    /// Samples consumed per analysis
    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Bins produced per analysis
    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    /// Analyse the most recent `fft_size` samples into `out`
    ///
    /// Missing samples (a short slice) are treated as silence.
    pub fn analyze(&mut self, samples: &[f32], out: &mut FrequencySnapshot) {
        let n = self.config.fft_size;

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let tau = self.config.smoothing;
        let db_range = self.config.max_db - self.config.min_db;

        for (bin, byte) in out.bins_mut().iter_mut().enumerate() {
            let Some(prev) = self.smoothed.get_mut(bin) else {
                *byte = 0;
                continue;
            };

            let magnitude = self.buffer[bin].norm() / n as f32;
            *prev = tau * *prev + (1.0 - tau) * magnitude;

            *byte = if *prev > 0.0 {
                let db = 20.0 * prev.log10();
                (255.0 * (db - self.config.min_db) / db_range).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(bin: usize, n: usize, amplitude: f32) -> Vec<f32> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / n as f32).sin())
            .collect()
    }

    fn unsmoothed() -> AnalyzerConfig {
        AnalyzerConfig {
            smoothing: 0.0,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let mut analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default()).unwrap();
        let mut snapshot = FrequencySnapshot::zeroed(analyzer.bin_count());
        analyzer.analyze(&vec![0.0; analyzer.fft_size()], &mut snapshot);
        assert!(snapshot.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyzer = SpectrumAnalyzer::new(unsmoothed()).unwrap();
        let mut snapshot = FrequencySnapshot::zeroed(analyzer.bin_count());
        analyzer.analyze(&sine(20, 256, 0.02), &mut snapshot);

        let peak = snapshot.as_slice().iter().copied().max().unwrap();
        assert_eq!(snapshot.bin(20), peak);
        assert!(snapshot.bin(19) < peak);
        assert!(snapshot.bin(21) < peak);
        assert!(peak > 150, "peak byte {} too low", peak);
        assert!(snapshot.bin(60) < peak);
    }

    #[test]
    fn test_smoothing_rises_gradually() {
        let mut analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default()).unwrap();
        let mut snapshot = FrequencySnapshot::zeroed(analyzer.bin_count());
        let tone = sine(8, 256, 0.02);

        analyzer.analyze(&tone, &mut snapshot);
        let first = snapshot.bin(8);
        analyzer.analyze(&tone, &mut snapshot);
        let second = snapshot.bin(8);

        assert!(second > first);

        analyzer.reset();
        analyzer.analyze(&tone, &mut snapshot);
        assert_eq!(snapshot.bin(8), first);
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let mut analyzer = SpectrumAnalyzer::new(unsmoothed()).unwrap();
        let mut snapshot = FrequencySnapshot::zeroed(analyzer.bin_count());
        analyzer.analyze(&[], &mut snapshot);
        assert!(snapshot.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = AnalyzerConfig {
            fft_size: 100,
            ..AnalyzerConfig::default()
        };
        assert!(SpectrumAnalyzer::new(config).is_err());
    }
}
