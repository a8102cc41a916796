//! Frame orchestrator: one full pipeline pass per display tick.
//!
//! Per tick: poll the audio session, extract features, then deform the mesh,
//! advance the camera, evaluate modulation and the alert trigger, and finally
//! hand a read-only [`Frame`] to the external renderer. Without a snapshot
//! (no session, paused, or no samples yet) the tick runs the idle branch.

use glam::{Mat4, Vec3};
use serde::Serialize;
use thiserror::Error;

use crate::audio::{AudioSession, FeatureExtractor, FeatureSet};
use crate::camera::{CameraDirector, CameraPose};
use crate::cues::{Cue, CueCursor, CueTrack};
use crate::mesh::{icosphere, DeformationEngine, Mesh};
use crate::modulation::{Modulation, ModulationEngine};
use crate::params::{Config, IdleMotion, RenderConfig};
use crate::path::{Curve, CurveError};
use crate::trigger::{TriggerMachine, TriggerState};

/// Failure reported by a renderer; logged, never fatal to the loop
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer backend failed: {0}")]
    Backend(String),

    #[error("frame output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// External "present frame" service
pub trait Renderer {
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;
}

/// External presentation layer (styling, overlays)
pub trait PresentationLayer {
    /// Alert styling switched on (`true`) or off (`false`)
    fn alert_changed(&mut self, active: bool);

    /// A new text cue became active
    fn cue_changed(&mut self, _cue: &Cue) {}
}

/// Which branch of the pipeline produced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameMode {
    /// Driven by this tick's audio features
    Active,
    /// Fixed idle drift, no feature dependency
    Idle,
}

/// Per-tick inputs that do not come from the orchestrator's own state
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Features for this tick, or None for the idle branch
    pub features: Option<FeatureSet>,
    /// Playback position used for cue lookup (seconds)
    pub playback_s: Option<f32>,
}

/// Scalar outputs of one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameState {
    pub index: u64,
    pub time_s: f32,
    pub mode: FrameMode,
    pub features: FeatureSet,
    pub camera: CameraPose,
    pub modulation: Modulation,
    /// Accumulated object rotation (Euler radians)
    pub rotation: Vec3,
    pub trigger: TriggerState,
    /// Largest vertex offset from the rest shape
    pub max_displacement: f32,
}

/// Everything the renderer needs for one frame (borrowed, read-only)
pub struct Frame<'a> {
    pub state: &'a FrameState,
    pub view_proj: Mat4,
    pub vertices: &'a [Vec3],
    pub indices: &'a [u32],
}

impl Frame<'_> {
    /// Vertex positions as raw bytes for buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }

    /// Triangle indices as raw bytes for buffer upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.indices)
    }

    pub fn rgb(&self) -> [f32; 3] {
        self.state.modulation.color.to_rgb()
    }

    /// Object transform: scale, then X/Y/Z rotation
    pub fn model_matrix(&self) -> Mat4 {
        let r = self.state.rotation;
        Mat4::from_euler(glam::EulerRot::XYZ, r.x, r.y, r.z)
            * Mat4::from_scale(Vec3::splat(self.state.modulation.scale))
    }
}

/// Owns every pipeline component and the state carried between ticks
pub struct FrameOrchestrator {
    extractor: FeatureExtractor,
    deformer: DeformationEngine,
    camera: CameraDirector,
    modulation: ModulationEngine,
    trigger: TriggerMachine,
    cues: CueCursor,
    idle: IdleMotion,
    render_config: RenderConfig,
    indices: Vec<u32>,
    session: Option<AudioSession>,
    rotation: Vec3,
    last_time_s: Option<f32>,
    state: FrameState,
}

impl FrameOrchestrator {
    /// Assemble the pipeline around a pre-built mesh and camera path
    pub fn new(config: &Config, mesh: Mesh, curve: Curve) -> Self {
        let camera = CameraDirector::new(curve, config.camera.clone());
        let modulation = ModulationEngine::new(config.modulation.clone());
        let trigger = TriggerMachine::new(&config.trigger);

        let state = FrameState {
            index: 0,
            time_s: 0.0,
            mode: FrameMode::Idle,
            features: FeatureSet::ZERO,
            camera: camera.pose(),
            modulation: modulation.evaluate(&FeatureSet::ZERO, 0.0),
            rotation: Vec3::ZERO,
            trigger: trigger.state(),
            max_displacement: 0.0,
        };

        Self {
            extractor: FeatureExtractor::new(config.features.clone()),
            deformer: DeformationEngine::new(mesh.rest, config.deform.clone()),
            cues: CueCursor::new(CueTrack::new(config.cues.clone())),
            idle: config.idle.clone(),
            render_config: config.render.clone(),
            indices: mesh.indices,
            session: None,
            rotation: Vec3::ZERO,
            last_time_s: None,
            camera,
            modulation,
            trigger,
            state,
        }
    }

    /// Build the default blob and camera path described by `config`
    pub fn from_config(config: &Config) -> Result<Self, CurveError> {
        let mesh = icosphere(config.deform.radius, config.deform.detail);
        let curve = Curve::from_arrays(&config.camera.control_points, config.camera.closed)?;

        tracing::info!(
            "Pipeline ready: {} vertices, {} triangles, path length {:.2}",
            mesh.rest.len(),
            mesh.triangle_count(),
            curve.length()
        );

        Ok(Self::new(config, mesh, curve))
    }

    /// Attach a session, tearing down any previous one
    pub fn start_session(&mut self, session: AudioSession) {
        self.stop_session();
        self.session = Some(session);
    }

    /// Tear down the current session; subsequent ticks run idle
    pub fn stop_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop();
        }
    }

    pub fn session(&self) -> Option<&AudioSession> {
        self.session.as_ref()
    }

    /// Transport access (play / pause)
    pub fn session_mut(&mut self) -> Option<&mut AudioSession> {
        self.session.as_mut()
    }

    /// Restart the camera journey and clear the analyser's smoothing
    pub fn restart(&mut self) {
        self.camera.restart();
        if let Some(session) = self.session.as_mut() {
            session.reset_analysis();
        }
    }

    /// Run one tick at wall-clock `time_s` and present the result
    pub fn tick(
        &mut self,
        time_s: f32,
        renderer: &mut dyn Renderer,
        presentation: &mut dyn PresentationLayer,
    ) -> FrameState {
        let dt = self
            .last_time_s
            .map(|last| (time_s - last).max(0.0))
            .unwrap_or(0.0);
        self.last_time_s = Some(time_s);

        let features = match self.session.as_mut().and_then(|s| s.poll(dt)) {
            Some(snapshot) => Some(self.extractor.extract(snapshot)),
            None => None,
        };
        let playback_s = self
            .session
            .as_ref()
            .filter(|s| s.is_playing())
            .map(|s| s.position_s());

        let state = self.step(
            time_s,
            TickInput {
                features,
                playback_s,
            },
            presentation,
        );

        if let Err(e) = renderer.present(&self.frame()) {
            tracing::warn!("Render error on frame {}: {}", state.index, e);
        }

        state
    }

    /// Pipeline pass without audio polling or rendering
    pub fn step(
        &mut self,
        time_s: f32,
        input: TickInput,
        presentation: &mut dyn PresentationLayer,
    ) -> FrameState {
        let (mode, features) = match input.features {
            Some(features) => (FrameMode::Active, features),
            None => (FrameMode::Idle, FeatureSet::ZERO),
        };

        let (camera, modulation) = match mode {
            FrameMode::Active => {
                self.deformer.update(time_s, features.bass);
                let camera = self.camera.advance(features.average);
                let modulation = self.modulation.evaluate(&features, time_s);
                (camera, modulation)
            }
            FrameMode::Idle => {
                self.deformer.relax();
                let camera = self.camera.advance_idle();
                let mut modulation = self.modulation.evaluate(&FeatureSet::ZERO, time_s);
                modulation.rotation_delta = Vec3::new(0.0, self.idle.rotation_y_rate, 0.0);
                (camera, modulation)
            }
        };
        self.rotation += modulation.rotation_delta;

        if let Some(event) = self.trigger.update(features.bass) {
            let active = event.alert_active();
            tracing::info!(
                "Alert {} (bass {:.0})",
                if active { "on" } else { "off" },
                features.bass
            );
            presentation.alert_changed(active);
        }

        if let Some(position) = input.playback_s {
            if let Some(cue) = self.cues.update(position) {
                tracing::info!("Cue at {:.2}s: {}", position, cue.text);
                presentation.cue_changed(cue);
            }
        }

        self.state = FrameState {
            index: self.state.index + 1,
            time_s,
            mode,
            features,
            camera,
            modulation,
            rotation: self.rotation,
            trigger: self.trigger.state(),
            max_displacement: self.deformer.max_displacement(),
        };

        tracing::debug!(
            "Frame {} {:?}: bass {:.0} avg {:.1} progress {:.4}",
            self.state.index,
            mode,
            features.bass,
            features.average,
            self.camera.travel().progress
        );

        self.state
    }

    /// Borrow the most recent frame for presentation
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            state: &self.state,
            view_proj: self.state.camera.view_proj(&self.render_config),
            vertices: self.deformer.displaced(),
            indices: &self.indices,
        }
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn camera(&self) -> &CameraDirector {
        &self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{FeedStatus, SampleFeed, WavFeed};

    /// Live-style feed: no samples for the first `pending` reads
    struct WarmingFeed {
        pending: usize,
    }

    impl SampleFeed for WarmingFeed {
        fn sample_rate(&self) -> u32 {
            8000
        }

        fn read(&mut self, _dt_s: f32, window: &mut [f32]) -> FeedStatus {
            if self.pending > 0 {
                self.pending -= 1;
                return FeedStatus::Pending;
            }
            for (i, sample) in window.iter_mut().enumerate() {
                *sample = (i as f32 * 0.2).sin() * 0.3;
            }
            FeedStatus::Ready
        }

        fn position_s(&self) -> f32 {
            0.0
        }

        fn describe(&self) -> String {
            "warming".to_string()
        }
    }

    #[derive(Default)]
    struct Recorder {
        alerts: Vec<bool>,
        cues: Vec<String>,
    }

    impl PresentationLayer for Recorder {
        fn alert_changed(&mut self, active: bool) {
            self.alerts.push(active);
        }

        fn cue_changed(&mut self, cue: &Cue) {
            self.cues.push(cue.text.clone());
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        vertex_bytes: usize,
        fail: bool,
    }

    impl Renderer for CountingRenderer {
        fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
            self.frames += 1;
            self.vertex_bytes = frame.vertex_bytes().len();
            if self.fail {
                return Err(RenderError::Backend("device lost".to_string()));
            }
            Ok(())
        }
    }

    fn small_config() -> Config {
        let mut config = Config::default();
        config.deform.detail = 2;
        config
    }

    fn orchestrator() -> FrameOrchestrator {
        FrameOrchestrator::from_config(&small_config()).unwrap()
    }

    fn bass(value: f32) -> TickInput {
        TickInput {
            features: Some(FeatureSet {
                bass: value,
                ..FeatureSet::ZERO
            }),
            playback_s: None,
        }
    }

    #[test]
    fn test_idle_tick_keeps_rest_shape() {
        let mut pipeline = orchestrator();
        let mut presentation = Recorder::default();
        let state = pipeline.step(1.0, TickInput::default(), &mut presentation);

        assert_eq!(state.mode, FrameMode::Idle);
        assert_eq!(state.max_displacement, 0.0);
        assert!((state.rotation.y - IdleMotion::default().rotation_y_rate).abs() < 1e-7);
        assert_eq!(state.rotation.x, 0.0);
        assert!(presentation.alerts.is_empty());
    }

    #[test]
    fn test_loud_bass_raises_alert_and_displacement() {
        let mut loud = orchestrator();
        let mut quiet = orchestrator();
        let mut presentation = Recorder::default();

        let loud_state = loud.step(0.5, bass(220.0), &mut presentation);
        let quiet_state = quiet.step(0.5, bass(0.0), &mut Recorder::default());

        assert_eq!(loud_state.trigger, TriggerState::Alert);
        assert_eq!(quiet_state.trigger, TriggerState::Normal);
        assert!(loud_state.max_displacement > quiet_state.max_displacement);
        assert_eq!(presentation.alerts, vec![true]);
    }

    #[test]
    fn test_pause_releases_alert() {
        let mut pipeline = orchestrator();
        let mut presentation = Recorder::default();

        pipeline.step(0.0, bass(250.0), &mut presentation);
        pipeline.step(0.1, bass(250.0), &mut presentation);
        pipeline.step(0.2, TickInput::default(), &mut presentation);

        assert_eq!(presentation.alerts, vec![true, false]);
        assert_eq!(pipeline.state().trigger, TriggerState::Normal);
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut pipeline = orchestrator();
        let mut presentation = Recorder::default();
        for i in 0..10 {
            pipeline.step(i as f32 / 60.0, bass(0.0), &mut presentation);
        }
        let rotation = pipeline.state().rotation;
        assert!((rotation.x - 0.05).abs() < 1e-5);
        assert!((rotation.y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_cues_follow_playback_position() {
        let mut config = small_config();
        config.cues = vec![Cue::new(0.0, "intro"), Cue::new(1.0, "drop")];
        let mut pipeline = FrameOrchestrator::from_config(&config).unwrap();
        let mut presentation = Recorder::default();

        for position in [0.0, 0.5, 1.2, 1.3] {
            let input = TickInput {
                features: Some(FeatureSet::ZERO),
                playback_s: Some(position),
            };
            pipeline.step(position, input, &mut presentation);
        }
        assert_eq!(presentation.cues, vec!["intro", "drop"]);
    }

    #[test]
    fn test_tick_without_session_presents_idle_frame() {
        let mut pipeline = orchestrator();
        let mut renderer = CountingRenderer::default();
        let state = pipeline.tick(0.0, &mut renderer, &mut Recorder::default());

        assert_eq!(state.mode, FrameMode::Idle);
        assert_eq!(renderer.frames, 1);
        assert_eq!(renderer.vertex_bytes, pipeline.frame().vertices.len() * 12);
    }

    #[test]
    fn test_tick_with_session_runs_active() {
        let mut pipeline = orchestrator();
        let samples = (0..8000).map(|i| ((i % 40) as f32 / 20.0) - 1.0).collect();
        let session = AudioSession::start(
            Box::new(WavFeed::from_samples(samples, 8000)),
            small_config().analyzer,
        )
        .unwrap();
        pipeline.start_session(session);

        let mut renderer = CountingRenderer::default();
        let mut presentation = Recorder::default();
        let mut modes = Vec::new();
        for i in 0..90 {
            let state = pipeline.tick(i as f32 / 60.0, &mut renderer, &mut presentation);
            modes.push(state.mode);
        }

        // One second of audio at 60 ticks/s, then the feed ends and we idle
        assert_eq!(modes[1], FrameMode::Active);
        assert_eq!(*modes.last().unwrap(), FrameMode::Idle);
        assert!(pipeline.session().unwrap().has_ended());
        assert_eq!(renderer.frames, 90);

        pipeline.stop_session();
        assert!(pipeline.session().is_none());
    }

    #[test]
    fn test_pending_feed_idles_then_goes_active() {
        let mut pipeline = orchestrator();
        let session = AudioSession::start(
            Box::new(WarmingFeed { pending: 2 }),
            small_config().analyzer,
        )
        .unwrap();
        pipeline.start_session(session);

        let mut renderer = CountingRenderer::default();
        let mut presentation = Recorder::default();
        let modes: Vec<_> = (0..4)
            .map(|i| pipeline.tick(i as f32 / 60.0, &mut renderer, &mut presentation).mode)
            .collect();

        assert_eq!(
            modes,
            vec![FrameMode::Idle, FrameMode::Idle, FrameMode::Active, FrameMode::Active]
        );
        assert_eq!(renderer.frames, 4);
    }

    #[test]
    fn test_restart_rewinds_camera_and_analysis() {
        let mut pipeline = orchestrator();
        let session = AudioSession::start(
            Box::new(WarmingFeed { pending: 0 }),
            small_config().analyzer,
        )
        .unwrap();
        pipeline.start_session(session);

        let mut renderer = CountingRenderer::default();
        let mut presentation = Recorder::default();
        let first = pipeline.tick(0.0, &mut renderer, &mut presentation).features;
        assert!(first.average > 0.0);
        for i in 1..5 {
            pipeline.tick(i as f32 / 60.0, &mut renderer, &mut presentation);
        }
        assert!(pipeline.camera().travel().progress > 0.0);

        pipeline.restart();
        assert_eq!(pipeline.camera().travel().progress, 0.0);

        // Smoothing history is gone, so the same window analyses like the first tick
        let again = pipeline.tick(5.0 / 60.0, &mut renderer, &mut presentation).features;
        assert_eq!(again, first);
    }

    #[test]
    fn test_renderer_failure_is_not_fatal() {
        let mut pipeline = orchestrator();
        let mut renderer = CountingRenderer {
            fail: true,
            ..CountingRenderer::default()
        };
        let mut presentation = Recorder::default();
        pipeline.tick(0.0, &mut renderer, &mut presentation);
        pipeline.tick(0.016, &mut renderer, &mut presentation);
        assert_eq!(renderer.frames, 2);
        assert_eq!(pipeline.state().index, 2);
    }

    #[test]
    fn test_degenerate_camera_paths_stay_finite() {
        let paths = [
            "[camera]\ncontrol_points = [[0.0, 0.0, 5.0]]\n",
            "[camera]\ncontrol_points = [[0.0, -5.0, 0.0], [0.0, 5.0, 0.0]]\nclosed = true\n",
        ];
        for text in paths {
            let mut config = Config::from_toml(text).unwrap();
            config.deform.detail = 1;
            let mut pipeline = FrameOrchestrator::from_config(&config).unwrap();
            let mut presentation = Recorder::default();

            pipeline.step(0.0, bass(120.0), &mut presentation);
            pipeline.step(0.1, TickInput::default(), &mut presentation);
            assert!(pipeline.frame().view_proj.is_finite(), "path {:?}", text);
        }
    }

    #[test]
    fn test_frame_matrices_are_finite() {
        let mut pipeline = orchestrator();
        pipeline.step(0.3, bass(100.0), &mut Recorder::default());
        let frame = pipeline.frame();
        assert!(frame.view_proj.is_finite());
        assert!(frame.model_matrix().is_finite());
        assert_eq!(frame.index_bytes().len(), frame.indices.len() * 4);
    }
}
