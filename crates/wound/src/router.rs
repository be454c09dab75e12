//! Tool contact routing
//!
//! The router turns contact events into model operations. Contact sources
//! (trigger volumes, controllers, scripted scenarios) push [`ContactEvent`]s
//! into a queue at any point during a frame; [`ContactRouter::tick`] drains
//! the queue once and then applies every tool still in contact, always in the
//! order Cutter, Spreader, Stitcher. This keeps simultaneous contacts
//! deterministic regardless of the order the sources reported them in.

use tracing::{debug, trace};

use crate::events::WoundEvent;
use crate::model::{StitchOutcome, WoundModel};
use crate::types::{ContactEvent, ToolKind};

/// Per-tick progress step for each tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSpeeds {
    pub incision: f32,
    pub dissection: f32,
    pub stitching: f32,
}

impl From<&surgery_config::SessionConfig> for ToolSpeeds {
    fn from(config: &surgery_config::SessionConfig) -> Self {
        Self {
            incision: config.incision_speed,
            dissection: config.dissection_speed,
            stitching: config.stitching_speed,
        }
    }
}

/// What a router tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterReport {
    /// Contact edges and layer transitions, in order
    pub events: Vec<WoundEvent>,
    /// The model was mutated this tick
    pub model_changed: bool,
    /// A stitching step ran this tick (even if it cleared `is_stitching`)
    pub stitched: bool,
}

/// Single writer of the wound model
#[derive(Debug, Clone)]
pub struct ContactRouter {
    speeds: ToolSpeeds,
    /// Level-triggered contact state, indexed by [`ToolKind::index`]
    in_contact: [bool; 3],
    /// Events received since the last tick
    pending: Vec<ContactEvent>,
}

impl ContactRouter {
    pub fn new(speeds: ToolSpeeds) -> Self {
        Self {
            speeds,
            in_contact: [false; 3],
            pending: Vec::new(),
        }
    }

    pub fn speeds(&self) -> ToolSpeeds {
        self.speeds
    }

    /// Queue a contact event for the next tick
    pub fn push(&mut self, event: ContactEvent) {
        self.pending.push(event);
    }

    /// Whether a tool is currently touching the tissue
    pub fn is_in_contact(&self, tool: ToolKind) -> bool {
        self.in_contact[tool.index()]
    }

    /// Tools currently in contact, in application order
    pub fn active_tools(&self) -> impl Iterator<Item = ToolKind> + '_ {
        ToolKind::ALL
            .into_iter()
            .filter(|tool| self.in_contact[tool.index()])
    }

    /// Drop all contacts and queued events (new session)
    pub fn clear(&mut self) {
        self.in_contact = [false; 3];
        self.pending.clear();
    }

    /// Drain queued contacts and apply every active tool once.
    pub fn tick(&mut self, model: &mut WoundModel) -> RouterReport {
        let mut report = RouterReport::default();

        for event in std::mem::take(&mut self.pending) {
            self.apply_contact_edge(event, model, &mut report);
        }

        for tool in ToolKind::ALL {
            if self.in_contact[tool.index()] {
                self.apply_tool(tool, model, &mut report);
            }
        }

        report
    }

    fn apply_contact_edge(
        &mut self,
        event: ContactEvent,
        model: &mut WoundModel,
        report: &mut RouterReport,
    ) {
        let tool = event.tool();
        let slot = &mut self.in_contact[tool.index()];

        match event {
            ContactEvent::Begin(_) => {
                if !*slot {
                    *slot = true;
                    debug!("Contact started: {tool}");
                    report.events.push(WoundEvent::ContactStarted { tool });
                }
            }
            ContactEvent::End(_) => {
                if tool == ToolKind::Stitcher && model.is_stitching() {
                    model.set_stitching(false);
                    report.model_changed = true;
                }
                if *slot {
                    *slot = false;
                    debug!("Contact ended: {tool}");
                    report.events.push(WoundEvent::ContactEnded { tool });
                }
            }
        }
    }

    fn apply_tool(&self, tool: ToolKind, model: &mut WoundModel, report: &mut RouterReport) {
        match tool {
            ToolKind::Cutter => {
                if !model.incision_complete() && model.incise(self.speeds.incision) {
                    report.model_changed = true;
                    if model.incision_complete() {
                        report.events.push(WoundEvent::IncisionCompleted);
                    }
                }
            }
            ToolKind::Spreader => {
                if model.incision_complete()
                    && !model.dissection_complete()
                    && model.dissect(self.speeds.dissection)
                {
                    report.model_changed = true;
                    if model.dissection_complete() {
                        report.events.push(WoundEvent::DissectionCompleted);
                    }
                }
            }
            ToolKind::Stitcher => {
                if !model.can_stitch() {
                    trace!("Stitcher in contact with nothing to close");
                    return;
                }
                model.set_stitching(true);
                report.stitched = true;

                let outcome = model.advance_stitch(self.speeds.stitching);
                report.model_changed |= outcome.changed();
                match outcome {
                    StitchOutcome::DissectionSealed => {
                        report.events.push(WoundEvent::DissectionSealed);
                    }
                    StitchOutcome::IncisionSealed => {
                        report.events.push(WoundEvent::IncisionSealed);
                        if model.is_fully_healed() {
                            report.events.push(WoundEvent::WoundHealed);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
