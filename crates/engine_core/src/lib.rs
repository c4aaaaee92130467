//! Core types shared across the OpenCTF systems:
//! - Pose (position + yaw) for characters whose collision never pitches
//! - Fixed-timestep tick clock for the simulation loop

pub mod pose;
pub mod time;

pub use pose::*;
pub use time::*;

// Re-export commonly used math types
pub use glam::{Vec2, Vec3};
