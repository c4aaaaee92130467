//! Character locomotion core for OpenCTF.
//!
//! Everything here runs once per fixed tick against two injected
//! collaborators: a [`ShapeCaster`] that answers capsule/ray sweeps against
//! the world, and a [`RagdollBridge`] that owns the physical ragdoll. The
//! crate never talks to a physics engine or window system directly, which
//! keeps the whole state machine unit-testable with a stub world.

pub mod config;
pub mod controller;
pub mod drag;
pub mod height;
pub mod motion;
pub mod mover;
pub mod world;

pub(crate) mod actions;

#[cfg(test)]
pub(crate) mod test_world;

pub use config::MovementConfig;
pub use controller::{CharacterController, Cue, TickEvent, TickInput, TickOutput};
pub use motion::{Mode, MotionState};
pub use mover::{Contact, GroundHit, MoveResult};
pub use world::{Capsule, NullRagdoll, RagdollBridge, ShapeCastHit, ShapeCaster, SurfaceTag};
