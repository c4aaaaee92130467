//! Physics system using Rapier3D for OpenCTF.

pub mod collision;
pub mod physics_world;
pub mod ragdoll;

pub use collision::*;
pub use physics_world::*;
pub use ragdoll::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
