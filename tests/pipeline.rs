//! End-to-end scenarios through the frame orchestrator.

use liquidsignal::audio::{AudioSession, FeatureExtractor, FrequencySnapshot, WavFeed};
use liquidsignal::cues::Cue;
use liquidsignal::frame::{FrameMode, TickInput};
use liquidsignal::mesh::{deform, icosphere};
use liquidsignal::params::{Config, DeformParams, FeatureConfig};
use liquidsignal::trigger::TriggerState;
use liquidsignal::{FrameOrchestrator, PresentationLayer};

#[derive(Default)]
struct Notifications {
    alerts: Vec<bool>,
    cues: Vec<String>,
}

impl PresentationLayer for Notifications {
    fn alert_changed(&mut self, active: bool) {
        self.alerts.push(active);
    }

    fn cue_changed(&mut self, cue: &Cue) {
        self.cues.push(cue.text.clone());
    }
}

fn snapshot_with_bass(bass: u8) -> FrequencySnapshot {
    let mut bins = vec![40u8; 128];
    bins[FeatureConfig::default().bass_bin] = bass;
    bins.into()
}

fn displacement(bass: u8, time: f32) -> f32 {
    let features = FeatureExtractor::default().extract(&snapshot_with_bass(bass));
    let rest = icosphere(2.0, 2).rest;
    let out = deform(rest.positions(), time, features.bass, &DeformParams::default());
    rest.positions()
        .iter()
        .zip(&out)
        .map(|(r, d)| r.distance(*d))
        .sum()
}

#[test]
fn loud_bass_snapshot_alerts_and_deforms_more() {
    let mut config = Config::default();
    config.deform.detail = 2;
    let extractor = FeatureExtractor::new(config.features.clone());

    let mut loud = FrameOrchestrator::from_config(&config).unwrap();
    let mut quiet = FrameOrchestrator::from_config(&config).unwrap();
    let mut loud_notes = Notifications::default();
    let mut quiet_notes = Notifications::default();

    let loud_input = TickInput {
        features: Some(extractor.extract(&snapshot_with_bass(220))),
        playback_s: None,
    };
    let quiet_input = TickInput {
        features: Some(extractor.extract(&snapshot_with_bass(0))),
        playback_s: None,
    };

    let loud_state = loud.step(2.0, loud_input, &mut loud_notes);
    let quiet_state = quiet.step(2.0, quiet_input, &mut quiet_notes);

    assert_eq!(loud_state.trigger, TriggerState::Alert);
    assert_eq!(quiet_state.trigger, TriggerState::Normal);
    assert_eq!(loud_notes.alerts, vec![true]);
    assert!(quiet_notes.alerts.is_empty());
    assert!(loud_state.max_displacement > quiet_state.max_displacement);

    assert!(displacement(220, 2.0) > displacement(0, 2.0));
}

#[test]
fn threshold_sequence_notifies_once_each_way() {
    let config = Config::default();
    let mut pipeline = FrameOrchestrator::from_config(&config).unwrap();
    let extractor = FeatureExtractor::new(config.features.clone());
    let mut notes = Notifications::default();

    let threshold = config.trigger.threshold as u8;
    for (i, bass) in [0, threshold + 1, threshold + 1, 0].into_iter().enumerate() {
        let input = TickInput {
            features: Some(extractor.extract(&snapshot_with_bass(bass))),
            playback_s: None,
        };
        pipeline.step(i as f32 / 60.0, input, &mut notes);
    }

    assert_eq!(notes.alerts, vec![true, false]);
}

#[test]
fn wav_session_plays_cues_then_idles() {
    let mut config = Config::default();
    config.deform.detail = 1;
    config.cues = vec![Cue::new(0.0, "System: Optimized."), Cue::new(0.25, "Engage.")];

    let sr = 8000;
    let samples: Vec<f32> = (0..sr / 2)
        .map(|i| (i as f32 * 0.3).sin() * 0.4)
        .collect();

    let mut pipeline = FrameOrchestrator::from_config(&config).unwrap();
    let session = AudioSession::start(
        Box::new(WavFeed::from_samples(samples, sr as u32)),
        config.analyzer.clone(),
    )
    .unwrap();
    pipeline.start_session(session);

    let mut notes = Notifications::default();
    let mut renderer = liquidsignal::sinks::HeadlessRenderer::new(1000);
    let mut modes = Vec::new();
    for i in 0..60 {
        modes.push(pipeline.tick(i as f32 / 60.0, &mut renderer, &mut notes).mode);
    }

    assert_eq!(notes.cues, vec!["System: Optimized.", "Engage."]);
    assert!(modes[..25].iter().all(|&m| m == FrameMode::Active));
    assert!(modes[40..].iter().all(|&m| m == FrameMode::Idle));

    let session = pipeline.session().unwrap();
    assert!(session.has_ended());
    assert!(!session.is_playing());
}

#[test]
fn paused_session_runs_idle_branch() {
    let mut config = Config::default();
    config.deform.detail = 1;
    let mut pipeline = FrameOrchestrator::from_config(&config).unwrap();
    let samples = vec![0.25f32; 8000];
    let session = AudioSession::start(
        Box::new(WavFeed::from_samples(samples, 8000)),
        config.analyzer.clone(),
    )
    .unwrap();
    pipeline.start_session(session);

    let mut notes = Notifications::default();
    let mut renderer = liquidsignal::sinks::HeadlessRenderer::new(1000);

    assert_eq!(pipeline.tick(0.0, &mut renderer, &mut notes).mode, FrameMode::Active);
    pipeline.session_mut().unwrap().pause();
    let paused = pipeline.tick(1.0 / 60.0, &mut renderer, &mut notes);
    assert_eq!(paused.mode, FrameMode::Idle);
    assert_eq!(paused.max_displacement, 0.0);

    pipeline.session_mut().unwrap().play();
    assert_eq!(pipeline.tick(2.0 / 60.0, &mut renderer, &mut notes).mode, FrameMode::Active);
}
