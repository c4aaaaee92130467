//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static level geometry (terrain, walls, capture zones)
    Environment = 1 << 0,
    /// Player capsules
    Player = 1 << 1,
    /// Ragdoll bones
    Ragdoll = 1 << 2,
}

impl CollisionGroup {
    /// Create a collision group for the environment.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Create a collision group for player capsules. Players block each
    /// other, which is what makes tackles land.
    pub fn player() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Player as u32);
        let filter = Group::from_bits_retain(Self::Environment as u32 | Self::Player as u32);
        (membership, filter)
    }

    /// Create a collision group for ragdoll bones.
    pub fn ragdoll() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Ragdoll as u32);
        let filter = Group::from_bits_retain(Self::Environment as u32 | Self::Ragdoll as u32);
        (membership, filter)
    }
}

/// Links a simulated character to its physics handles.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

impl PhysicsBody {
    pub fn new(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider,
        }
    }
}
