//! Headless renderer and presentation layer: frames go to the log and,
//! optionally, to a JSON Lines dump.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cues::Cue;
use crate::frame::{Frame, FrameState, PresentationLayer, RenderError, Renderer};

/// One line of the frame dump
#[derive(Serialize)]
struct FrameRecord<'a> {
    #[serde(flatten)]
    state: &'a FrameState,
    rgb: [f32; 3],
    vertex_count: usize,
}

/// Renderer that logs frame summaries instead of drawing
pub struct HeadlessRenderer {
    log_every: u64,
    dump: Option<BufWriter<File>>,
    presented: u64,
}

impl HeadlessRenderer {
    pub fn new(log_every: u64) -> Self {
        Self {
            log_every: log_every.max(1),
            dump: None,
            presented: 0,
        }
    }

    /// Also write every frame as one JSON object per line to `path`
    pub fn with_dump(mut self, path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let file = File::create(path.as_ref())?;
        tracing::info!("Dumping frames to {}", path.as_ref().display());
        self.dump = Some(BufWriter::new(file));
        Ok(self)
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Flush any buffered dump output
    pub fn finish(&mut self) -> Result<(), RenderError> {
        if let Some(dump) = self.dump.as_mut() {
            dump.flush()?;
        }
        Ok(())
    }
}

impl Renderer for HeadlessRenderer {
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        self.presented += 1;
        let state = frame.state;

        if state.index % self.log_every == 0 {
            let color = state.modulation.color;
            tracing::info!(
                "frame {:>6} {:?} t={:.2}s bass={:>3.0} avg={:>5.1} hsl=({:.2},{:.2},{:.2}) \
                 cam=({:.2},{:.2},{:.2}) disp={:.3} {:?}",
                state.index,
                state.mode,
                state.time_s,
                state.features.bass,
                state.features.average,
                color.hue,
                color.saturation,
                color.lightness,
                state.camera.position.x,
                state.camera.position.y,
                state.camera.position.z,
                state.max_displacement,
                state.trigger,
            );
        }

        if let Some(dump) = self.dump.as_mut() {
            let record = FrameRecord {
                state,
                rgb: frame.rgb(),
                vertex_count: frame.vertices.len(),
            };
            serde_json::to_writer(&mut *dump, &record)
                .map_err(|e| RenderError::Backend(format!("frame dump: {}", e)))?;
            dump.write_all(b"\n")?;
        }

        Ok(())
    }
}

/// Presentation layer that reports alert and cue changes through tracing
#[derive(Debug, Default)]
pub struct LogPresentation {
    pub alert_active: bool,
    pub alert_count: u32,
    pub last_cue: Option<String>,
}

impl PresentationLayer for LogPresentation {
    fn alert_changed(&mut self, active: bool) {
        self.alert_active = active;
        if active {
            self.alert_count += 1;
            tracing::warn!(">>> ALERT styling on");
        } else {
            tracing::info!("<<< alert styling off");
        }
    }

    fn cue_changed(&mut self, cue: &Cue) {
        tracing::info!("[cue] {}", cue.text);
        self.last_cue = Some(cue.text.clone());
    }
}
