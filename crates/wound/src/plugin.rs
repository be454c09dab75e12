//! Bevy integration
//!
//! Contact sources write [`ToolContact`] messages during `Update`. The plugin
//! forwards them to the session and ticks it once per frame, then republishes
//! every transition as a [`WoundEventMessage`] for audio, particle and UI
//! systems.

use bevy::ecs::message::Message;
use bevy::prelude::*;
use surgery_config::SessionConfig;

use crate::events::WoundEvent;
use crate::session::{TickReport, TrainingSession};
use crate::types::ContactEvent;

/// Resource owning the running training session
#[derive(Resource, Debug)]
pub struct WoundSession(pub TrainingSession);

/// Most recent tick, for HUDs and diagnostics
#[derive(Resource, Debug, Default)]
pub struct LastTick(pub Option<TickReport>);

/// Message from a contact source (trigger volume, controller, script)
#[derive(Message, Debug, Clone, Copy)]
pub struct ToolContact(pub ContactEvent);

/// Message carrying one transition produced by a session tick
#[derive(Message, Debug, Clone, Copy)]
pub struct WoundEventMessage(pub WoundEvent);

/// System set containing the session systems; order readers of
/// [`WoundEventMessage`] after it
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct WoundSystems;

/// Session-level commands from menus or debug tools
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start a new procedure
    Reset,
    /// Hide all staple pins
    ResetPins,
    /// Reveal all staple pins
    ForceActivatePins,
}

/// Plugin running a [`TrainingSession`] inside the Bevy schedule.
///
/// If a [`WoundSession`] resource is already present (for example one built
/// with mesh and pin collaborators attached) it is kept; otherwise a
/// headless session is created from `config`. The session's config is
/// published as a [`SessionConfig`] resource for HUD and menu systems.
pub struct WoundPlugin {
    pub config: SessionConfig,
}

impl WoundPlugin {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

impl Default for WoundPlugin {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Plugin for WoundPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<WoundSession>() {
            app.insert_resource(WoundSession(TrainingSession::new(self.config.clone())));
        }
        // Expose the config the session actually runs with
        let config = app.world().resource::<WoundSession>().0.config().clone();
        app.insert_resource(config);

        app.init_resource::<LastTick>()
            .add_message::<ToolContact>()
            .add_message::<SessionCommand>()
            .add_message::<WoundEventMessage>()
            .add_systems(
                Update,
                (apply_session_commands, forward_contacts, tick_session)
                    .chain()
                    .in_set(WoundSystems),
            );
    }
}

fn apply_session_commands(
    mut commands: MessageReader<SessionCommand>,
    mut session: ResMut<WoundSession>,
    mut last_tick: ResMut<LastTick>,
    mut out: MessageWriter<WoundEventMessage>,
) {
    for command in commands.read() {
        let events = match command {
            SessionCommand::Reset => {
                last_tick.0 = None;
                session.0.reset()
            }
            SessionCommand::ResetPins => session.0.reset_all_pins(),
            SessionCommand::ForceActivatePins => session.0.force_activate_all_pins(),
        };
        out.write_batch(events.into_iter().map(WoundEventMessage));
    }
}

fn forward_contacts(mut contacts: MessageReader<ToolContact>, mut session: ResMut<WoundSession>) {
    for contact in contacts.read() {
        session.0.push_contact(contact.0);
    }
}

fn tick_session(
    mut session: ResMut<WoundSession>,
    mut last_tick: ResMut<LastTick>,
    mut out: MessageWriter<WoundEventMessage>,
) {
    let report = session.0.tick();
    out.write_batch(report.events.iter().copied().map(WoundEventMessage));
    last_tick.0 = Some(report);
}
