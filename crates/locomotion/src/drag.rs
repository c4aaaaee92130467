//! Frame-rate independent linear drag for the planar velocity channels.

use glam::Vec2;

/// Removes up to `drag * dt` of speed from `velocity`, stopping it dead
/// rather than reversing when the stopping amount exceeds the speed.
pub fn apply_drag(velocity: Vec2, drag: f32, dt: f32) -> Vec2 {
    let speed = velocity.length();
    let stop = drag * dt;
    if stop >= speed || speed <= f32::EPSILON {
        Vec2::ZERO
    } else {
        velocity - velocity / speed * stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_reduces_speed_along_direction() {
        let v = apply_drag(Vec2::new(3.0, 4.0), 1.0, 1.0);
        // 5 m/s reduced by 1 m/s, direction preserved
        assert!((v.length() - 4.0).abs() < 1e-5);
        assert!((v.normalize() - Vec2::new(0.6, 0.8)).length() < 1e-5);
    }

    #[test]
    fn drag_never_reverses() {
        let v = apply_drag(Vec2::new(0.5, 0.0), 10.0, 1.0);
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn zero_velocity_stays_zero() {
        assert_eq!(apply_drag(Vec2::ZERO, 5.0, 0.016), Vec2::ZERO);
    }
}
