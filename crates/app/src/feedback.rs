//! Log-only feedback for headless runs
//!
//! Stands in for the stitcher's particles, sound and haptics: every cue is
//! written to the log with the parameters a real sink would use.

use surgery_config::FeedbackConfig;
use tracing::{debug, info};
use wound::{FeedbackSink, ToolKind};

/// Number of distinct pitches the pin sound cycles through
const PITCH_STEPS: usize = 5;

#[derive(Debug, Default)]
pub struct LogFeedback {
    config: FeedbackConfig,
    stitching: bool,
    cues: usize,
}

impl LogFeedback {
    /// Number of pin sounds played
    pub fn cues(&self) -> usize {
        self.cues
    }

    pub fn is_stitching(&self) -> bool {
        self.stitching
    }
}

/// Pin sound pitch, spread across `1 ± jitter` so neighbouring pins differ
pub fn pin_pitch(index: usize, jitter: f32) -> f32 {
    let step = (index % PITCH_STEPS) as f32 / (PITCH_STEPS - 1) as f32;
    1.0 - jitter + 2.0 * jitter * step
}

impl FeedbackSink for LogFeedback {
    fn configure(&mut self, config: &FeedbackConfig) {
        self.config = *config;
    }

    fn on_contact_start(&mut self, tool: ToolKind) {
        if tool != ToolKind::Stitcher {
            return;
        }
        self.stitching = true;
        info!(
            "Stitching effects on, haptic pulse {:.2} for {:.2}s",
            self.config.haptic_intensity, self.config.haptic_duration_secs
        );
    }

    fn on_contact_end(&mut self, tool: ToolKind) {
        if tool == ToolKind::Stitcher && self.stitching {
            self.stitching = false;
            info!("Stitching effects off");
        }
    }

    fn on_pin_activated(&mut self, index: usize) {
        self.cues += 1;
        debug!(
            "Pin {index} sound: volume {:.2}, pitch {:.2}",
            self.config.pin_sound_volume,
            pin_pitch(index, self.config.pin_pitch_jitter)
        );
    }
}
