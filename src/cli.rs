//! Command-line argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::audio::{AudioError, SampleFeed, SynthFeed, WavFeed};
use crate::params::{Config, ConfigError};

/// Where the analysed audio comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Built-in procedural demo track
    Synth,
    /// WAV file given with --wav
    Wav,
    /// Default input device
    Live,
    /// No audio: idle motion only
    None,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "liquidsignal")]
#[command(about = "Audio-reactive liquid metal visual engine (headless runner)", long_about = None)]
pub struct Args {
    /// Audio source
    #[arg(long, value_enum, default_value = "synth")]
    pub source: SourceKind,

    /// WAV file to analyse (implies --source wav)
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of ticks to run (default: until the audio ends, or 10 s)
    #[arg(long, value_name = "TICKS")]
    pub frames: Option<u64>,

    /// Override the tick rate from the config
    #[arg(long, value_name = "HZ")]
    pub fps: Option<u32>,

    /// Pace ticks at the display rate instead of running as fast as possible
    #[arg(long)]
    pub realtime: bool,

    /// Write every frame as JSON Lines to this file
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Effective source, letting --wav imply the WAV source
    pub fn source_kind(&self) -> SourceKind {
        if self.wav.is_some() {
            SourceKind::Wav
        } else {
            self.source
        }
    }

    /// Load the config file (or defaults) and apply command-line overrides
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(fps) = self.fps {
            config.run.fps = fps;
        }
        config.validate()?;
        Ok(config)
    }

    /// Open the selected sample feed; `None` runs without audio
    pub fn open_feed(&self) -> Result<Option<Box<dyn SampleFeed>>, AudioError> {
        let feed: Box<dyn SampleFeed> = match self.source_kind() {
            SourceKind::None => return Ok(None),
            SourceKind::Synth => Box::new(SynthFeed::demo(None)?),
            SourceKind::Wav => match &self.wav {
                Some(path) => Box::new(WavFeed::open(path)?),
                None => {
                    return Err(AudioError::Device(
                        "--source wav requires --wav PATH".to_string(),
                    ))
                }
            },
            SourceKind::Live => open_live()?,
        };
        Ok(Some(feed))
    }
}

#[cfg(feature = "live-input")]
fn open_live() -> Result<Box<dyn SampleFeed>, AudioError> {
    Ok(Box::new(crate::audio::LiveFeed::open()?))
}

#[cfg(not(feature = "live-input"))]
fn open_live() -> Result<Box<dyn SampleFeed>, AudioError> {
    Err(AudioError::Device(
        "built without the `live-input` feature".to_string(),
    ))
}
