//! Shared configuration for the surgical training simulation
//!
//! This crate is the single source of truth for tool speeds, pin layout and
//! feedback parameters. Values are set once when a training session is built
//! and are not reconfigured at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Environment variable holding the path to a JSON session config
pub const CONFIG_ENV_VAR: &str = "SURGERY_CONFIG";

/// Incision progress added per tick of blade contact
pub const DEFAULT_INCISION_SPEED: f32 = 1.0;

/// Dissection progress added per tick of spreader contact (near-instant)
pub const DEFAULT_DISSECTION_SPEED: f32 = 99.0;

/// Progress removed per tick of stitcher contact
pub const DEFAULT_STITCHING_SPEED: f32 = 2.0;

/// Number of staple pins in the default forearm scene
pub const DEFAULT_TOTAL_PINS: usize = 15;

/// Minimum change in overall closure before pins are reconciled
pub const DEFAULT_PIN_HYSTERESIS: f32 = 0.5;

/// Order in which staple pins are revealed as the wound closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivationOrder {
    /// Start at the middle pin and alternate left/right outward
    #[default]
    CenterOut,
    /// First to last
    Sequential,
}

/// Which pin is hidden when fewer pins are needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeactivationPolicy {
    /// Hide the most recently revealed pin (exact reverse of activation)
    #[default]
    Lifo,
    /// Hide the highest-index visible pin (the legacy deactivation scan).
    /// Activation still reveals the first hidden pin in activation order.
    HighestIndex,
}

/// Parameters forwarded to audio/haptic/visual feedback sinks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Controller rumble amplitude when stitching starts (0.0-1.0)
    pub haptic_intensity: f32,
    /// Controller rumble duration in seconds
    pub haptic_duration_secs: f32,
    /// Volume of the staple placement sound (0.0-1.0)
    pub pin_sound_volume: f32,
    /// Random pitch variation applied to the staple sound (+/- fraction)
    pub pin_pitch_jitter: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            haptic_intensity: 0.3,
            haptic_duration_secs: 0.1,
            pin_sound_volume: 0.5,
            pin_pitch_jitter: 0.1,
        }
    }
}

/// Configuration for one training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct SessionConfig {
    /// Incision progress per tick of blade contact
    pub incision_speed: f32,
    /// Dissection progress per tick of spreader contact
    pub dissection_speed: f32,
    /// Closure per tick of stitcher contact
    pub stitching_speed: f32,
    /// Pin count used when no pin geometry is attached
    pub total_pins: usize,
    pub activation_order: ActivationOrder,
    pub deactivation_policy: DeactivationPolicy,
    /// Overall-progress delta (0-100 scale) required before pins update
    pub pin_hysteresis: f32,
    pub feedback: FeedbackConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            incision_speed: DEFAULT_INCISION_SPEED,
            dissection_speed: DEFAULT_DISSECTION_SPEED,
            stitching_speed: DEFAULT_STITCHING_SPEED,
            total_pins: DEFAULT_TOTAL_PINS,
            activation_order: ActivationOrder::default(),
            deactivation_policy: DeactivationPolicy::default(),
            pin_hysteresis: DEFAULT_PIN_HYSTERESIS,
            feedback: FeedbackConfig::default(),
        }
    }
}

/// Errors raised while loading or validating a session config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SessionConfig {
    /// Parse and validate a config from a JSON string
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load from the file named by `SURGERY_CONFIG`, or defaults if unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Check that every value is usable by the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_speed("incision_speed", self.incision_speed)?;
        check_speed("dissection_speed", self.dissection_speed)?;
        check_speed("stitching_speed", self.stitching_speed)?;

        if self.total_pins == 0 {
            return Err(ConfigError::Invalid {
                field: "total_pins",
                reason: "must be at least 1".to_string(),
            });
        }

        if !self.pin_hysteresis.is_finite() || self.pin_hysteresis < 0.0 {
            return Err(ConfigError::Invalid {
                field: "pin_hysteresis",
                reason: format!("must be a non-negative number, got {}", self.pin_hysteresis),
            });
        }

        Ok(())
    }
}

fn check_speed(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}
