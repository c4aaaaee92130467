//! Physically simulated player ragdoll.
//!
//! The rig owns its own small Rapier world (bones, joints and a ground
//! plane) instead of living in the level world. The locomotion core only
//! flips it on and off through [`locomotion::RagdollBridge`] and polls how
//! fast it is still tumbling; the game steps it while active.

use glam::Vec3;
use log::debug;
use rapier3d::prelude::*;

use crate::collision::{CollisionGroup, PhysicsBody};
use crate::physics_world::PhysicsWorld;

struct BoneDef {
    name: &'static str,
    /// Offset from the rig root when spawned.
    offset: Vec3,
    half_height: f32,
    radius: f32,
}

/// Torso-rooted humanoid: head and limbs hang off bone 0.
const BONES: &[BoneDef] = &[
    BoneDef {
        name: "torso",
        offset: Vec3::new(0.0, 0.1, 0.0),
        half_height: 0.3,
        radius: 0.2,
    },
    BoneDef {
        name: "head",
        offset: Vec3::new(0.0, 0.65, 0.0),
        half_height: 0.0,
        radius: 0.15,
    },
    BoneDef {
        name: "arm_l",
        offset: Vec3::new(-0.35, 0.15, 0.0),
        half_height: 0.25,
        radius: 0.08,
    },
    BoneDef {
        name: "arm_r",
        offset: Vec3::new(0.35, 0.15, 0.0),
        half_height: 0.25,
        radius: 0.08,
    },
    BoneDef {
        name: "leg_l",
        offset: Vec3::new(-0.15, -0.65, 0.0),
        half_height: 0.35,
        radius: 0.1,
    },
    BoneDef {
        name: "leg_r",
        offset: Vec3::new(0.15, -0.65, 0.0),
        half_height: 0.35,
        radius: 0.1,
    },
];

struct Bone {
    name: &'static str,
    body: PhysicsBody,
}

/// One player's ragdoll rig.
pub struct RagdollRig {
    world: PhysicsWorld,
    bones: Vec<Bone>,
    joints: Vec<ImpulseJointHandle>,
    /// Character root the rig spawns at, tracked while disabled.
    anchor: Vec3,
    active: bool,
}

impl RagdollRig {
    pub fn new(gravity: f32) -> Self {
        let mut world = PhysicsWorld::new();
        world.gravity = vector![0.0, gravity, 0.0];
        world.add_ground_plane(locomotion::SurfaceTag::UNTAGGED);
        Self {
            world,
            bones: Vec::new(),
            joints: Vec::new(),
            anchor: Vec3::ZERO,
            active: false,
        }
    }

    /// Track the character so the rig spawns where the player fell.
    pub fn follow(&mut self, position: Vec3) {
        if !self.active {
            self.anchor = position;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// World position of the torso while active, the tracked character
    /// position otherwise.
    pub fn position(&self) -> Vec3 {
        if let Some(bone) = self.bones.first() {
            if let Some(body) = self.world.rigid_body_set.get(bone.body.rigid_body) {
                let t = body.translation();
                return Vec3::new(t.x, t.y, t.z);
            }
        }
        self.anchor
    }

    /// Advance the rig simulation by `dt`. Does nothing while disabled.
    pub fn step(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.world.integration_parameters.dt = dt;
        self.world.step();
    }

    fn spawn_bones(&mut self) {
        let (membership, filter) = CollisionGroup::ragdoll();
        for def in BONES {
            let center = self.anchor + def.offset;
            let body = RigidBodyBuilder::dynamic()
                .translation(vector![center.x, center.y, center.z])
                .linear_damping(0.5)
                .angular_damping(0.5)
                .build();
            let body_handle = self.world.rigid_body_set.insert(body);

            let collider = if def.half_height > 0.0 {
                ColliderBuilder::capsule_y(def.half_height, def.radius)
            } else {
                ColliderBuilder::ball(def.radius)
            }
            .friction(0.8)
            .restitution(0.2)
            .density(1.2)
            .collision_groups(InteractionGroups::new(membership, filter))
            .build();
            let collider_handle = self.world.collider_set.insert_with_parent(
                collider,
                body_handle,
                &mut self.world.rigid_body_set,
            );

            self.bones.push(Bone {
                name: def.name,
                body: PhysicsBody::new(body_handle, collider_handle),
            });
        }

        // Hang everything off the torso with plain spherical joints.
        let torso = self.bones[0].body.rigid_body;
        for i in 1..self.bones.len() {
            let def = &BONES[i];
            let joint = SphericalJointBuilder::new()
                .local_anchor1(point![
                    def.offset.x.clamp(-0.2, 0.2),
                    def.offset.y.clamp(-0.3, 0.3),
                    0.0
                ])
                .local_anchor2(point![0.0, def.half_height + def.radius, 0.0])
                .contacts_enabled(false)
                .build();
            let handle =
                self.world
                    .impulse_joint_set
                    .insert(torso, self.bones[i].body.rigid_body, joint, true);
            self.joints.push(handle);
        }
    }

    fn despawn_bones(&mut self) {
        for bone in self.bones.drain(..) {
            self.world.rigid_body_set.remove(
                bone.body.rigid_body,
                &mut self.world.island_manager,
                &mut self.world.collider_set,
                &mut self.world.impulse_joint_set,
                &mut self.world.multibody_joint_set,
                true,
            );
        }
        self.joints.clear();
    }
}

impl locomotion::RagdollBridge for RagdollRig {
    fn enable(&mut self, impulse: Vec3) {
        if self.active {
            return;
        }
        debug!("ragdoll on at {:?} with impulse {impulse:?}", self.anchor);
        self.spawn_bones();
        let torso = self.bones[0].body.rigid_body;
        if let Some(body) = self.world.rigid_body_set.get_mut(torso) {
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
        self.active = true;
    }

    fn disable(&mut self) {
        if !self.active {
            return;
        }
        debug!("ragdoll off, settled at {:?}", self.position());
        self.anchor = self.position();
        self.despawn_bones();
        self.active = false;
    }

    fn settle_speed(&self) -> f32 {
        let Some(bone) = self.bones.first() else {
            return 0.0;
        };
        self.world
            .rigid_body_set
            .get(bone.body.rigid_body)
            .map_or(0.0, |body| body.linvel().norm())
    }
}
