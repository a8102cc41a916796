//! liquidsignal library - audio-reactive liquid metal visuals
//!
//! The per-tick pipeline: spectrum snapshot → features → mesh deformation,
//! camera travel, color/light modulation and an alert trigger, handed to an
//! external renderer once per display refresh.

pub mod audio;
pub mod camera;
pub mod cli;
pub mod cues;
pub mod frame;
pub mod mesh;
pub mod modulation;
pub mod params;
pub mod path;
pub mod sinks;
pub mod trigger;

pub use audio::{AudioSession, FeatureExtractor, FeatureSet, FrequencySnapshot};
pub use camera::{CameraDirector, CameraPose, TravelState};
pub use frame::{Frame, FrameOrchestrator, FrameState, PresentationLayer, Renderer, TickInput};
pub use params::Config;
pub use path::Curve;
