//! Collaborator seams: the shape-cast primitive and the ragdoll bridge.
//!
//! The locomotion core consumes these traits; the `physics` crate provides
//! the Rapier-backed implementations and tests use flat-plane stubs.

use glam::Vec3;

/// Opaque identity of a hit surface. The mover reports tags without knowing
/// what they mean; gameplay code (capture zones, flags, players) assigns and
/// interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceTag(pub u32);

impl SurfaceTag {
    pub const UNTAGGED: SurfaceTag = SurfaceTag(0);
}

/// Nearest blocking surface along a sweep.
#[derive(Debug, Clone, Copy)]
pub struct ShapeCastHit {
    /// World position of the contact.
    pub point: Vec3,
    /// Surface normal at the contact, unit length, pointing out of the
    /// blocking geometry.
    pub normal: Vec3,
    /// Travel distance before the shapes touch. Zero means the sweep
    /// started overlapping.
    pub distance: f32,
    pub surface: SurfaceTag,
}

/// Upright capsule hanging from a fixed head anchor.
///
/// `center` is an offset from the character position. Height changes move
/// the center so the top of the capsule stays put:
/// `center.y = anchor_offset + (2*full_height - height) / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub height: f32,
    pub radius: f32,
    pub center: Vec3,
}

impl Capsule {
    /// Center height satisfying the anchor invariant for a given capsule
    /// height.
    pub fn center_y_for(height: f32, anchor_offset: f32, full_height: f32) -> f32 {
        anchor_offset + (2.0 * full_height - height) / 2.0
    }

    /// Endpoints of the capsule's inner segment in world space.
    pub fn segment(&self, position: Vec3) -> (Vec3, Vec3) {
        let center = position + self.center;
        let half = (self.height / 2.0 - self.radius).max(0.0);
        (center - Vec3::Y * half, center + Vec3::Y * half)
    }
}

/// Sweeps a capsule or ray through the world and returns the nearest
/// blocking surface. A miss is free space, never an error.
pub trait ShapeCaster {
    fn cast_capsule(
        &self,
        capsule: &Capsule,
        position: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Option<ShapeCastHit>;

    fn cast_ray(&self, origin: Vec3, direction: Vec3, distance: f32) -> Option<ShapeCastHit>;
}

/// Enable/disable the physically simulated body and read how fast it is
/// still tumbling. The locomotion core only ever flips the switch and polls
/// the settle speed; the simulation itself lives behind the bridge.
pub trait RagdollBridge {
    fn enable(&mut self, impulse: Vec3);
    fn disable(&mut self);
    /// Current speed of the simulated body, used to gate player recovery.
    fn settle_speed(&self) -> f32;
}

/// Bridge that simulates nothing. Used by observer-side characters and in
/// tests that never reach the ragdoll state.
#[derive(Debug, Default)]
pub struct NullRagdoll {
    enabled: bool,
}

impl RagdollBridge for NullRagdoll {
    fn enable(&mut self, _impulse: Vec3) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn settle_speed(&self) -> f32 {
        0.0
    }
}
