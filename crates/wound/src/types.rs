use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Surgical tool that can touch the tissue contact zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ToolKind {
    /// Scalpel blade, opens the incision
    Cutter = 0,
    /// Retractor/spreader, opens the dissection
    Spreader = 1,
    /// Stapler/needle, closes both layers
    Stitcher = 2,
}

impl ToolKind {
    /// All tools in the fixed order the router applies them each tick
    pub const ALL: [ToolKind; 3] = [ToolKind::Cutter, ToolKind::Spreader, ToolKind::Stitcher];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Cutter => "cutter",
            ToolKind::Spreader => "spreader",
            ToolKind::Stitcher => "stitcher",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tool name: {0:?}")]
pub struct ToolParseError(pub String);

impl FromStr for ToolKind {
    type Err = ToolParseError;

    /// Accepts canonical names and the scene object names (`blade`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cutter" | "blade" | "scalpel" => Ok(ToolKind::Cutter),
            "spreader" => Ok(ToolKind::Spreader),
            "stitcher" | "stapler" => Ok(ToolKind::Stitcher),
            _ => Err(ToolParseError(s.to_string())),
        }
    }
}

/// Discrete contact input for the router
///
/// `Begin` is level-triggered: the tool keeps acting every tick until the
/// matching `End` arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactEvent {
    Begin(ToolKind),
    End(ToolKind),
}

impl ContactEvent {
    pub fn tool(self) -> ToolKind {
        match self {
            ContactEvent::Begin(tool) | ContactEvent::End(tool) => tool,
        }
    }
}

/// Blend-shape channel on the tissue mesh, one per wound layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlendChannel {
    Incision = 0,
    Dissection = 1,
}

impl BlendChannel {
    pub const ALL: [BlendChannel; 2] = [BlendChannel::Incision, BlendChannel::Dissection];

    /// Blend-shape index on the skinned mesh
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Snapshot of the wound model, used for restore and inspection
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WoundState {
    /// 0 = intact, 100 = fully opened
    pub incision_progress: f32,
    /// 0 = intact, 100 = fully spread
    pub dissection_progress: f32,
    pub incision_complete: bool,
    pub dissection_complete: bool,
    pub is_stitching: bool,
}
