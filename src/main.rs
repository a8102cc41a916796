//! liquidsignal - headless runner for the audio-reactive visual pipeline
//!
//! Drives the frame orchestrator at the display rate from a synth, WAV or
//! live audio source and logs what a renderer would draw.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use liquidsignal::audio::AudioSession;
use liquidsignal::cli::{Args, SourceKind};
use liquidsignal::sinks::{HeadlessRenderer, LogPresentation};
use liquidsignal::FrameOrchestrator;

/// Run length (seconds) when the source never ends and --frames is absent
const DEFAULT_SECONDS: u64 = 10;

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            default_level
                .parse()
                .with_context(|| format!("Invalid log level '{}'", default_level))?,
        )
        .from_env_lossy(); // RUST_LOG env var takes precedence

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = args.load_config().context("Failed to load configuration")?;
    let mut pipeline =
        FrameOrchestrator::from_config(&config).context("Failed to build camera path")?;

    let feed = args.open_feed().context("Failed to open audio source")?;
    // A WAV run without --frames plays to the end of the file
    let until_end = args.frames.is_none() && args.source_kind() == SourceKind::Wav;
    if let Some(feed) = feed {
        let session = AudioSession::start(feed, config.analyzer.clone())
            .context("Failed to start audio session")?;
        pipeline.start_session(session);
    }

    let mut renderer = HeadlessRenderer::new(config.run.log_every);
    if let Some(path) = &args.dump {
        renderer = renderer
            .with_dump(path)
            .with_context(|| format!("Failed to create frame dump {}", path.display()))?;
    }
    let mut presentation = LogPresentation::default();

    let tick_s = config.run.tick_s();
    let max_frames = match args.frames {
        Some(frames) => frames,
        None if until_end => u64::MAX,
        None => DEFAULT_SECONDS * config.run.fps as u64,
    };
    let started = Instant::now();

    tracing::info!(
        "Running at {} Hz ({})",
        config.run.fps,
        if args.realtime { "realtime" } else { "as fast as possible" }
    );

    let mut frames = 0u64;
    while frames < max_frames {
        let time_s = if args.realtime {
            started.elapsed().as_secs_f32()
        } else {
            frames as f32 * tick_s
        };

        pipeline.tick(time_s, &mut renderer, &mut presentation);
        frames += 1;

        if until_end && pipeline.session().is_some_and(|s| s.has_ended()) {
            break;
        }

        if args.realtime {
            // Wait for the next display refresh
            let next = Duration::from_secs_f64(frames as f64 * tick_s as f64);
            if let Some(remaining) = next.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    pipeline.stop_session();
    renderer.finish().context("Failed to flush frame dump")?;

    let state = pipeline.state();
    tracing::info!(
        "Done: {} frames in {:.2}s, {} alert(s), camera progress {:.3}, rotation y {:.2} rad",
        renderer.presented(),
        started.elapsed().as_secs_f32(),
        presentation.alert_count,
        pipeline.camera().travel().progress,
        state.rotation.y
    );
    Ok(())
}
