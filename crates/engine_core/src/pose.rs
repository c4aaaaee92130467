//! Character pose: world position plus a yaw angle.
//!
//! Pitch belongs to the camera and never affects collision, so the pose
//! deliberately has no full rotation. Yaw 0 faces -Z, positive yaw turns
//! toward -X (right-handed, matching `glam::Quat::from_rotation_y`).

use glam::{Vec2, Vec3};

/// A position and heading in the world.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    /// Heading in radians around the world Y axis.
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Forward direction in the horizontal plane.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Right direction in the horizontal plane.
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Forward as a planar (x, z) vector.
    pub fn forward_planar(&self) -> Vec2 {
        Vec2::new(-self.yaw.sin(), -self.yaw.cos())
    }

    /// Rotate a local (strafe, forward) input axis into a planar world
    /// direction. The result keeps the input's magnitude.
    pub fn rotate_input(&self, axis: Vec2) -> Vec2 {
        let right = Vec2::new(self.yaw.cos(), -self.yaw.sin());
        let forward = self.forward_planar();
        right * axis.x + forward * axis.y
    }
}

/// Lift a planar (x, z) vector into 3D with the given height component.
pub fn planar_to_world(v: Vec2, y: f32) -> Vec3 {
    Vec3::new(v.x, y, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_at_zero_yaw_is_neg_z() {
        let p = Pose::new(Vec3::ZERO, 0.0);
        assert!((p.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((p.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn rotate_input_preserves_magnitude() {
        let p = Pose::new(Vec3::ZERO, 1.3);
        let out = p.rotate_input(Vec2::new(0.6, 0.8));
        assert!((out.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotate_input_forward_matches_forward() {
        let p = Pose::new(Vec3::ZERO, 0.7);
        let out = p.rotate_input(Vec2::new(0.0, 1.0));
        assert!((out - p.forward_planar()).length() < 1e-6);
    }
}
