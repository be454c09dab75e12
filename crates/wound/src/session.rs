//! Training session: explicit wiring of model, router, scheduler and
//! collaborators.
//!
//! A session is built once per procedure with every dependency passed in
//! through [`SessionBuilder`]; nothing is looked up by name at runtime. Each
//! call to [`TrainingSession::tick`] runs the stages in a fixed order:
//!
//! 1. The router drains queued contacts and mutates the model
//! 2. The pin scheduler reads the updated model and reconciles pins
//! 3. Changed blend-shape weights are pushed to the mesh
//! 4. Pin changes are pushed to the pin geometry
//! 5. All events of the tick are dispatched to feedback sinks
//!
//! Running the scheduler after the router means pins never lag the model by
//! a tick.

use surgery_config::SessionConfig;
use tracing::{debug, info, warn};

use crate::collaborators::{dispatch_feedback, BlendShapeTarget, FeedbackSink, PinGeometry};
use crate::events::WoundEvent;
use crate::model::WoundModel;
use crate::pins::{overall_progress, PinChange, PinScheduler};
use crate::router::{ContactRouter, ToolSpeeds};
use crate::types::{BlendChannel, ContactEvent, ToolKind, WoundState};

/// Everything that happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Events in emission order
    pub events: Vec<WoundEvent>,
    /// Wound state after the tick
    pub state: WoundState,
    /// Visible pins after the tick
    pub active_pins: usize,
}

impl TickReport {
    pub fn pin_changes(&self) -> impl Iterator<Item = &WoundEvent> {
        self.events.iter().filter(|event| event.is_pin_change())
    }
}

/// Builder for [`TrainingSession`]
pub struct SessionBuilder {
    config: SessionConfig,
    initial_state: Option<WoundState>,
    mesh: Option<Box<dyn BlendShapeTarget>>,
    pins: Option<Box<dyn PinGeometry>>,
    feedback: Vec<Box<dyn FeedbackSink>>,
}

impl SessionBuilder {
    /// Start the session from a specific wound state instead of intact tissue
    pub fn with_state(mut self, state: WoundState) -> Self {
        self.initial_state = Some(state);
        self
    }

    pub fn with_mesh(mut self, mesh: impl BlendShapeTarget + 'static) -> Self {
        self.mesh = Some(Box::new(mesh));
        self
    }

    /// Attach pin geometry; its child count replaces `config.total_pins`
    pub fn with_pin_geometry(mut self, pins: impl PinGeometry + 'static) -> Self {
        self.pins = Some(Box::new(pins));
        self
    }

    pub fn with_feedback(mut self, sink: impl FeedbackSink + 'static) -> Self {
        self.feedback.push(Box::new(sink));
        self
    }

    pub fn build(self) -> TrainingSession {
        let total_pins = match &self.pins {
            Some(pins) => {
                let count = pins.pin_count();
                info!("Found {count} stapler pins");
                count
            }
            None => {
                warn!(
                    "No pin geometry attached, tracking {} pins without visuals",
                    self.config.total_pins
                );
                self.config.total_pins
            }
        };
        if self.mesh.is_none() {
            debug!("No blend-shape mesh attached, weights will not be rendered");
        }

        let model = self
            .initial_state
            .map(WoundModel::from_state)
            .unwrap_or_default();

        let mut session = TrainingSession {
            router: ContactRouter::new(ToolSpeeds::from(&self.config)),
            scheduler: PinScheduler::from_config(&self.config, total_pins),
            last_weights: [f32::NAN; 2],
            model,
            mesh: self.mesh,
            pins: self.pins,
            feedback: self.feedback,
            tick: 0,
            config: self.config,
        };

        if let Some(pins) = session.pins.as_mut() {
            for index in 0..total_pins {
                pins.set_pin_visible(index, false);
            }
        }
        for sink in session.feedback.iter_mut() {
            sink.configure(&session.config.feedback);
        }
        session.sync_weights();

        session
    }
}

/// One surgical training procedure
pub struct TrainingSession {
    config: SessionConfig,
    model: WoundModel,
    router: ContactRouter,
    scheduler: PinScheduler,
    mesh: Option<Box<dyn BlendShapeTarget>>,
    pins: Option<Box<dyn PinGeometry>>,
    feedback: Vec<Box<dyn FeedbackSink>>,
    /// Weights last pushed to the mesh (NaN = never pushed)
    last_weights: [f32; 2],
    tick: u64,
}

impl std::fmt::Debug for TrainingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainingSession")
            .field("tick", &self.tick)
            .field("model", &self.model)
            .field("active_pins", &self.scheduler.active_count())
            .field("has_mesh", &self.mesh.is_some())
            .field("has_pins", &self.pins.is_some())
            .field("feedback_sinks", &self.feedback.len())
            .finish()
    }
}

impl TrainingSession {
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder {
            config,
            initial_state: None,
            mesh: None,
            pins: None,
            feedback: Vec::new(),
        }
    }

    /// Session with no collaborators attached
    pub fn new(config: SessionConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn model(&self) -> &WoundModel {
        &self.model
    }

    pub fn scheduler(&self) -> &PinScheduler {
        &self.scheduler
    }

    pub fn router(&self) -> &ContactRouter {
        &self.router
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn overall_progress(&self) -> f32 {
        overall_progress(&self.model)
    }

    pub fn is_fully_healed(&self) -> bool {
        self.model.is_fully_healed()
    }

    /// Queue a contact event for the next tick
    pub fn push_contact(&mut self, event: ContactEvent) {
        self.router.push(event);
    }

    pub fn begin_contact(&mut self, tool: ToolKind) {
        self.push_contact(ContactEvent::Begin(tool));
    }

    pub fn end_contact(&mut self, tool: ToolKind) {
        self.push_contact(ContactEvent::End(tool));
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;

        let routed = self.router.tick(&mut self.model);
        let mut events = routed.events;

        let stitch_active = routed.stitched || self.model.is_stitching();
        let changes = self.scheduler.observe(&self.model, stitch_active);

        events.extend(self.sync_weights());
        events.extend(self.apply_pin_changes(&changes));
        self.dispatch(&events);

        TickReport {
            tick: self.tick,
            events,
            state: self.model.snapshot(),
            active_pins: self.scheduler.active_count(),
        }
    }

    /// Start a new procedure: intact wound, no contacts, no pins.
    pub fn reset(&mut self) -> Vec<WoundEvent> {
        self.model.reset();
        self.router.clear();
        self.tick = 0;

        let changes = self.scheduler.reset_all_pins();
        let mut events = self.apply_pin_changes(&changes);
        events.extend(self.sync_weights());
        events.push(WoundEvent::SessionReset);
        self.dispatch(&events);

        info!("Training session reset");
        events
    }

    /// Hide every pin without touching wound progress.
    pub fn reset_all_pins(&mut self) -> Vec<WoundEvent> {
        let changes = self.scheduler.reset_all_pins();
        let events = self.apply_pin_changes(&changes);
        self.dispatch(&events);
        info!("Reset all stapler pins");
        events
    }

    /// Reveal every pin immediately (diagnostics).
    pub fn force_activate_all_pins(&mut self) -> Vec<WoundEvent> {
        let changes = self.scheduler.force_activate_all_pins();
        let events = self.apply_pin_changes(&changes);
        self.dispatch(&events);
        info!("Activated all stapler pins for testing");
        events
    }

    /// Push weights that changed since the last push.
    fn sync_weights(&mut self) -> Vec<WoundEvent> {
        let mut events = Vec::new();
        for channel in BlendChannel::ALL {
            let weight = self.model.channel_weight(channel);
            let last = &mut self.last_weights[channel.index()];
            if *last == weight {
                continue;
            }
            *last = weight;
            if let Some(mesh) = self.mesh.as_mut() {
                mesh.set_channel_weight(channel, weight);
            }
            events.push(WoundEvent::ChannelWeightChanged { channel, weight });
        }
        events
    }

    fn apply_pin_changes(&mut self, changes: &[PinChange]) -> Vec<WoundEvent> {
        changes
            .iter()
            .map(|&change| {
                if let Some(pins) = self.pins.as_mut() {
                    pins.set_pin_visible(change.index(), change.visible());
                }
                match change {
                    PinChange::Activated(index) => WoundEvent::PinActivated { index },
                    PinChange::Deactivated(index) => WoundEvent::PinDeactivated { index },
                }
            })
            .collect()
    }

    fn dispatch(&mut self, events: &[WoundEvent]) {
        for sink in self.feedback.iter_mut() {
            for event in events {
                dispatch_feedback(sink.as_mut(), event);
            }
        }
    }
}
