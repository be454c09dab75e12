//! Scripted training scenarios
//!
//! A scenario is a JSON file listing contact edges and tick counts:
//!
//! ```json
//! {
//!   "name": "incise only",
//!   "steps": [
//!     { "action": "begin", "tool": "blade" },
//!     { "action": "run", "ticks": 120 },
//!     { "action": "end", "tool": "blade" }
//!   ]
//! }
//! ```
//!
//! Tool names accept the same aliases as [`ToolKind`]'s `FromStr`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use surgery_config::SessionConfig;
use wound::{ContactEvent, ToolKind, ToolParseError, WoundState};

/// Scenario loading errors
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Step {step}: {source}")]
    UnknownTool {
        step: usize,
        #[source]
        source: ToolParseError,
    },

    #[error("Scenario {0:?} has no steps")]
    Empty(String),
}

/// One scripted step as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Tool starts touching the tissue
    Begin { tool: String },
    /// Tool leaves the tissue
    End { tool: String },
    /// Advance a fixed number of frames
    Run { ticks: u32 },
    /// Advance until the wound is healed, at most `max_ticks` frames
    RunUntilHealed { max_ticks: u32 },
    /// Start a new procedure
    Reset,
}

/// A named list of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Wound state to start from (intact when absent)
    #[serde(default)]
    pub initial_state: Option<WoundState>,
    pub steps: Vec<ScenarioStep>,
}

/// Step with tool names resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Contact(ContactEvent),
    Run(u32),
    RunUntilHealed(u32),
    Reset,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Full procedure: incise, dissect, then stitch until healed.
    ///
    /// Tick counts are derived from the configured speeds so the procedure
    /// completes for any valid config.
    pub fn full_procedure(config: &SessionConfig) -> Self {
        // Float-to-int `as` saturates, so tiny speeds clamp to u32::MAX
        let ticks_to_open = |speed: f32| ((100.0 / speed).ceil() as u32).saturating_add(1);
        // Both layers close at the stitching speed, one after the other
        let stitch_budget = ticks_to_open(config.stitching_speed)
            .saturating_mul(2)
            .saturating_add(10);

        let steps = vec![
            ScenarioStep::Begin { tool: "cutter".into() },
            ScenarioStep::Run {
                ticks: ticks_to_open(config.incision_speed),
            },
            ScenarioStep::End { tool: "cutter".into() },
            ScenarioStep::Begin { tool: "spreader".into() },
            ScenarioStep::Run {
                ticks: ticks_to_open(config.dissection_speed),
            },
            ScenarioStep::End { tool: "spreader".into() },
            ScenarioStep::Begin { tool: "stitcher".into() },
            ScenarioStep::RunUntilHealed {
                max_ticks: stitch_budget,
            },
            ScenarioStep::End { tool: "stitcher".into() },
            ScenarioStep::Run { ticks: 1 },
        ];

        Self {
            name: "full procedure".into(),
            initial_state: None,
            steps,
        }
    }

    /// Resolve tool names into actions.
    pub fn actions(&self) -> Result<Vec<Action>, ScenarioError> {
        if self.steps.is_empty() {
            return Err(ScenarioError::Empty(self.name.clone()));
        }

        let tool = |step: usize, name: &str| {
            name.parse::<ToolKind>()
                .map_err(|source| ScenarioError::UnknownTool { step, source })
        };

        self.steps
            .iter()
            .enumerate()
            .map(|(step, entry)| {
                Ok::<_, ScenarioError>(match entry {
                    ScenarioStep::Begin { tool: name } => {
                        Action::Contact(ContactEvent::Begin(tool(step, name.as_str())?))
                    }
                    ScenarioStep::End { tool: name } => {
                        Action::Contact(ContactEvent::End(tool(step, name.as_str())?))
                    }
                    ScenarioStep::Run { ticks } => Action::Run(*ticks),
                    ScenarioStep::RunUntilHealed { max_ticks } => {
                        Action::RunUntilHealed(*max_ticks)
                    }
                    ScenarioStep::Reset => Action::Reset,
                })
            })
            .collect()
    }
}
