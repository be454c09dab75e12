//! Wound progression engine for VR surgical training
//!
//! This crate provides the core of the simulation:
//! - [`model`] - Incision/dissection progress and completion flags
//! - [`router`] - Maps tool contacts to model operations, once per tick
//! - [`pins`] - Reveals staple pins in step with stitching progress
//! - [`collaborators`] - Narrow interfaces to mesh, pin geometry and feedback
//! - [`events`] - Transition events emitted to observers
//! - [`session`] - Wires everything together in a fixed tick order
//!
//! The engine does not depend on Bevy. Enable the `bevy` feature for
//! [`plugin::WoundPlugin`].

pub mod collaborators;
pub mod constants;
pub mod events;
pub mod model;
pub mod pins;
pub mod router;
pub mod session;
pub mod types;

#[cfg(feature = "bevy")]
pub mod plugin;

pub use collaborators::*;
pub use constants::*;
pub use events::*;
pub use model::*;
pub use pins::*;
pub use router::*;
pub use session::*;
pub use types::*;

pub use surgery_config::{ActivationOrder, DeactivationPolicy, FeedbackConfig, SessionConfig};
