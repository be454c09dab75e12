//! surgery-sim - headless surgical training session runner
//!
//! Runs a scripted procedure through the wound plugin and logs every event.
//! Usage: `surgery-sim [scenario.json]`. The session config is read from the
//! file named by `SURGERY_CONFIG` when set.

use std::process::ExitCode;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use surgery_config::{ConfigError, SessionConfig};

mod config;
mod feedback;
mod runner;
mod scenario;

use config::ScenarioSource;
use runner::RunSummary;
use scenario::{Scenario, ScenarioError};

#[derive(Debug, thiserror::Error)]
enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

fn main() -> ExitCode {
    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: bevy::log::Level::INFO,
        ..default()
    });

    match run(&mut app) {
        Ok(summary) => {
            info!(
                "Finished after {} frames: healed={}, pins={}, incision={:.1}, dissection={:.1}",
                summary.frames,
                summary.healed,
                summary.active_pins,
                summary.state.incision_progress,
                summary.state.dissection_progress
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(app: &mut App) -> Result<RunSummary, SimError> {
    let config = SessionConfig::from_env()?;

    let scenario = match ScenarioSource::from_env() {
        ScenarioSource::BuiltIn => Scenario::full_procedure(&config),
        ScenarioSource::File(path) => {
            info!("Loading scenario from {}", path.display());
            Scenario::load(path)?
        }
    };
    let actions = scenario.actions()?;

    info!(
        "Starting scenario {:?} ({} steps, {} pins)",
        scenario.name,
        actions.len(),
        config.total_pins
    );

    runner::install(app, config, scenario.initial_state);
    Ok(runner::execute(app, &actions))
}
