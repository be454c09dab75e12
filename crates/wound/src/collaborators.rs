//! Narrow interfaces to the systems the engine drives but does not own.
//!
//! Rendering, scene objects and audio/haptics live outside this crate. A
//! session talks to them only through these traits, and every collaborator is
//! optional: a session with nothing attached still tracks progress and pins.

use surgery_config::FeedbackConfig;

use crate::events::WoundEvent;
use crate::types::{BlendChannel, ToolKind};

/// Skinned tissue mesh with one blend-shape channel per wound layer.
pub trait BlendShapeTarget: Send + Sync {
    /// Set a channel's weight, `value` in `[0, 100]`
    fn set_channel_weight(&mut self, channel: BlendChannel, value: f32);
}

/// Parent object holding the pre-placed staple pins as children.
pub trait PinGeometry: Send + Sync {
    /// Number of pin children, read once when the session is built
    fn pin_count(&self) -> usize;

    fn set_pin_visible(&mut self, index: usize, visible: bool);
}

/// Audio, particle, material and haptic responses.
///
/// Sinks subscribe to the same contact edges the router consumes, so they
/// never need their own proximity checks. All methods default to no-ops.
pub trait FeedbackSink: Send + Sync {
    /// Called once when the sink is attached to a session
    fn configure(&mut self, _config: &FeedbackConfig) {}

    fn on_contact_start(&mut self, _tool: ToolKind) {}

    fn on_contact_end(&mut self, _tool: ToolKind) {}

    fn on_pin_activated(&mut self, _index: usize) {}

    fn on_pin_deactivated(&mut self, _index: usize) {}

    /// Every event, after the specific hook above (if any) has run
    fn on_event(&mut self, _event: &WoundEvent) {}
}

/// Route one event to the matching hooks of a sink
pub fn dispatch_feedback(sink: &mut dyn FeedbackSink, event: &WoundEvent) {
    match *event {
        WoundEvent::ContactStarted { tool } => sink.on_contact_start(tool),
        WoundEvent::ContactEnded { tool } => sink.on_contact_end(tool),
        WoundEvent::PinActivated { index } => sink.on_pin_activated(index),
        WoundEvent::PinDeactivated { index } => sink.on_pin_deactivated(index),
        _ => {}
    }
    sink.on_event(event);
}

/// In-memory pin row, used by headless runs and tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinRow {
    pub visible: Vec<bool>,
}

impl PinRow {
    pub fn new(count: usize) -> Self {
        Self {
            visible: vec![false; count],
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&visible| visible).count()
    }
}

impl PinGeometry for PinRow {
    fn pin_count(&self) -> usize {
        self.visible.len()
    }

    fn set_pin_visible(&mut self, index: usize, visible: bool) {
        if let Some(slot) = self.visible.get_mut(index) {
            *slot = visible;
        }
    }
}

/// In-memory blend-shape weights, used by headless runs and tests
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlendWeights {
    pub weights: [f32; 2],
}

impl BlendShapeTarget for BlendWeights {
    fn set_channel_weight(&mut self, channel: BlendChannel, value: f32) {
        self.weights[channel.index()] = value;
    }
}
