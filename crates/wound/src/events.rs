//! Transition events emitted by a training session.

use serde::{Deserialize, Serialize};

use crate::types::{BlendChannel, ToolKind};

/// Events emitted while a session ticks.
///
/// These let feedback systems (audio, particles, haptics, UI) react to the
/// wound's lifecycle without coupling to the engine's internals. Events are
/// produced in the order they happened within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WoundEvent {
    /// A tool started touching the tissue
    ContactStarted { tool: ToolKind },
    /// A tool stopped touching the tissue
    ContactEnded { tool: ToolKind },
    /// Incision reached 100
    IncisionCompleted,
    /// Dissection reached 100
    DissectionCompleted,
    /// Stitching closed the dissection layer back to 0
    DissectionSealed,
    /// Stitching closed the incision back to 0
    IncisionSealed,
    /// No layer is open anymore
    WoundHealed,
    /// A blend-shape channel has a new weight
    ChannelWeightChanged { channel: BlendChannel, weight: f32 },
    /// A staple pin was revealed
    PinActivated { index: usize },
    /// A staple pin was hidden
    PinDeactivated { index: usize },
    /// The session was reset for a new procedure
    SessionReset,
}

impl WoundEvent {
    /// Whether this event toggles pin visibility
    pub fn is_pin_change(&self) -> bool {
        matches!(
            self,
            WoundEvent::PinActivated { .. } | WoundEvent::PinDeactivated { .. }
        )
    }
}
