//! Drives a scenario through the Bevy schedule

use bevy::prelude::*;
use surgery_config::SessionConfig;
use wound::plugin::{
    SessionCommand, ToolContact, WoundEventMessage, WoundPlugin, WoundSession, WoundSystems,
};
use wound::{BlendWeights, PinRow, TrainingSession, WoundEvent, WoundState};

use crate::feedback::LogFeedback;
use crate::scenario::Action;

/// Every event observed during the run, in order
#[derive(Resource, Debug, Default)]
pub struct Transcript {
    pub events: Vec<WoundEvent>,
}

impl Transcript {
    pub fn count(&self, predicate: impl Fn(&WoundEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }
}

/// Outcome of a scenario run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub healed: bool,
    pub active_pins: usize,
    pub state: WoundState,
}

/// Build the session with in-memory collaborators and register the plugin.
pub fn install(app: &mut App, config: SessionConfig, initial_state: Option<WoundState>) {
    let mut builder = TrainingSession::builder(config.clone())
        .with_mesh(BlendWeights::default())
        .with_pin_geometry(PinRow::new(config.total_pins))
        .with_feedback(LogFeedback::default());
    if let Some(state) = initial_state {
        builder = builder.with_state(state);
    }

    app.insert_resource(WoundSession(builder.build()))
        .init_resource::<Transcript>()
        .add_plugins(WoundPlugin::new(config))
        .add_systems(Update, record_events.after(WoundSystems));
}

/// Run every action, one `app.update()` per simulated frame.
pub fn execute(app: &mut App, actions: &[Action]) -> RunSummary {
    let mut frames = 0u64;

    for action in actions {
        match *action {
            Action::Contact(event) => {
                app.world_mut().write_message(ToolContact(event));
            }
            Action::Run(ticks) => {
                for _ in 0..ticks {
                    advance(app, &mut frames);
                }
            }
            Action::RunUntilHealed(max_ticks) => {
                let mut healed = false;
                for _ in 0..max_ticks {
                    advance(app, &mut frames);
                    if session(app).is_fully_healed() {
                        healed = true;
                        break;
                    }
                }
                if !healed {
                    warn!("Wound not healed after {max_ticks} ticks");
                }
            }
            Action::Reset => {
                app.world_mut().write_message(SessionCommand::Reset);
                advance(app, &mut frames);
            }
        }
    }

    let session = session(app);
    RunSummary {
        frames,
        healed: session.is_fully_healed(),
        active_pins: session.scheduler().active_count(),
        state: session.model().snapshot(),
    }
}

fn advance(app: &mut App, frames: &mut u64) {
    app.update();
    *frames += 1;
}

fn session(app: &App) -> &TrainingSession {
    &app.world().resource::<WoundSession>().0
}

fn record_events(
    mut messages: MessageReader<WoundEventMessage>,
    mut transcript: ResMut<Transcript>,
) {
    for WoundEventMessage(event) in messages.read() {
        match event {
            WoundEvent::ChannelWeightChanged { .. } => trace!("{event:?}"),
            WoundEvent::PinActivated { .. } | WoundEvent::PinDeactivated { .. } => {
                debug!("{event:?}")
            }
            _ => info!("{event:?}"),
        }
        transcript.events.push(*event);
    }
}
