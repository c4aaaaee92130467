//! Capsule height management. The capsule hangs from a fixed head anchor, so
//! height changes extend or retract the bottom; growing into the ground
//! pushes the body up instead of clipping through.

use glam::Vec3;

use crate::config::MovementConfig;
use crate::motion::MotionState;
use crate::world::ShapeCaster;

/// Applies a height change of `delta` (positive grows toward the ground).
/// The change is clamped so the height stays inside the configured range.
pub fn manage_height(
    state: &mut MotionState,
    cfg: &MovementConfig,
    caster: &dyn ShapeCaster,
    delta: f32,
) {
    let clamped = (state.capsule.height + delta).clamp(cfg.tucked_height, cfg.full_height)
        - state.capsule.height;
    if clamped >= 0.0 {
        // Growing extends the bottom downward; if the ground is in the way,
        // lift the body so the new bottom rests just above it.
        if let Some(hit) = caster.cast_capsule(
            &state.capsule,
            state.pose.position,
            Vec3::NEG_Y,
            clamped,
        ) {
            state.pose.position.y += clamped + cfg.ground_dist - hit.distance - cfg.epsilon;
        }
    } else {
        // Shrinking raises the bottom; translate down to keep it planted.
        state.pose.position.y += clamped;
    }
    state.set_height(state.capsule.height + clamped, cfg);
}

/// Landing squash and stand-up, run once per tick before the action rules.
/// A pending landing impact squashes the capsule at the recovery midpoint;
/// otherwise the capsule grows back toward full height.
pub fn landing_squash_and_standup(
    state: &mut MotionState,
    cfg: &MovementConfig,
    caster: &dyn ShapeCaster,
    dt: f32,
) {
    if state.mode.is_tucked() {
        return;
    }
    if state.landing_velocity < 0.0 {
        // Two half-steps around the recovery give the midpoint squash.
        manage_height(
            state,
            cfg,
            caster,
            state.landing_velocity * cfg.impact_to_height * dt * 0.5,
        );
        state.landing_velocity = (state.landing_velocity + cfg.impact_recovery * dt).min(0.0);
        manage_height(
            state,
            cfg,
            caster,
            state.landing_velocity * cfg.impact_to_height * dt * 0.5,
        );
    } else if state.landing_velocity == 0.0 {
        let growth = (cfg.standup_speed * dt).min(cfg.full_height - state.capsule.height);
        manage_height(state, cfg, caster, growth);
    }
}

/// Snaps the capsule to the tucked height while diving or sliding. Unlike
/// `manage_height` this does not move the body.
pub fn tuck_if_diving(state: &mut MotionState, cfg: &MovementConfig) {
    if state.mode.is_tucked() {
        state.set_height(cfg.tucked_height, cfg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Mode;
    use crate::mover::check_grounded;
    use crate::test_world::PlaneWorld;

    fn standing_state(cfg: &MovementConfig, y: f32) -> MotionState {
        MotionState::new(Vec3::new(0.0, y, 0.0), 0.0, cfg)
    }

    #[test]
    fn shrink_translates_body_down() {
        let cfg = MovementConfig::default();
        let world = PlaneWorld::floor(0.0);
        // bottom resting on the floor at anchor y = 1.5
        let mut state = standing_state(&cfg, 1.5);
        manage_height(&mut state, &cfg, &world, -0.4);
        assert!((state.capsule.height - 1.6).abs() < 1e-5);
        assert!((state.pose.position.y - 1.1).abs() < 1e-5);
    }

    #[test]
    fn growth_into_ground_lifts_body() {
        let cfg = MovementConfig::default();
        let world = PlaneWorld::floor(0.0);
        let mut state = standing_state(&cfg, 1.5);
        state.set_height(cfg.tucked_height, &cfg);
        state.pose.position.y = 0.505; // tucked bottom just above the floor
        manage_height(&mut state, &cfg, &world, 0.3);
        assert!((state.capsule.height - 1.3).abs() < 1e-5);
        // lifted so the grown bottom still clears the ground
        let grounded = check_grounded(&world, &state.capsule, state.pose.position, &cfg);
        assert!(grounded.is_some());
        let (bottom, _) = state.capsule.segment(state.pose.position);
        assert!(bottom.y - state.capsule.radius > 0.0);
    }

    #[test]
    fn height_never_leaves_configured_range() {
        let cfg = MovementConfig::default();
        let world = PlaneWorld::floor(-100.0);
        let mut state = standing_state(&cfg, 1.5);
        manage_height(&mut state, &cfg, &world, -5.0);
        assert_eq!(state.capsule.height, cfg.tucked_height);
        manage_height(&mut state, &cfg, &world, 5.0);
        assert_eq!(state.capsule.height, cfg.full_height);
    }

    #[test]
    fn landing_impact_squashes_then_recovers() {
        let cfg = MovementConfig::default();
        let world = PlaneWorld::floor(-100.0);
        let mut state = standing_state(&cfg, 1.5);
        state.mode = Mode::Grounded;
        state.landing_velocity = -2.0;
        let dt = 0.02;
        landing_squash_and_standup(&mut state, &cfg, &world, dt);
        assert!(state.capsule.height < cfg.full_height);
        assert!(state.landing_velocity > -2.0);
        // run recovery to completion, then stand-up restores full height
        for _ in 0..200 {
            landing_squash_and_standup(&mut state, &cfg, &world, dt);
        }
        assert_eq!(state.landing_velocity, 0.0);
        assert!((state.capsule.height - cfg.full_height).abs() < 1e-4);
    }

    #[test]
    fn tuck_keeps_anchor_fixed() {
        let cfg = MovementConfig::default();
        let mut state = standing_state(&cfg, 1.5);
        state.mode = Mode::Diving;
        let before = state.pose.position;
        tuck_if_diving(&mut state, &cfg);
        assert_eq!(state.capsule.height, cfg.tucked_height);
        assert_eq!(state.pose.position, before);
        // tucked center: -1.5 + (4 - 1) / 2 = 0
        assert!(state.capsule.center.y.abs() < 1e-6);
    }
}
