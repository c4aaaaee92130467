//! Movement tunables. Every timing window, impulse and drag constant of the
//! locomotion core lives here so a match config file can override them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tunables for one character's locomotion. Angles are in degrees, times in
/// seconds, speeds in m/s.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Yaw radians per look-input unit.
    pub mouse_sensitivity: f32,

    // ── Run channel ──────────────────────────────────────────────────
    /// Speed cap while running.
    pub max_speed: f32,
    pub run_acceleration: f32,
    pub run_deceleration: f32,
    /// Speed cap while crouch-walking.
    pub max_walk_speed: f32,
    pub walk_deceleration: f32,

    // ── Ground & sweep ───────────────────────────────────────────────
    /// Downward probe length for the grounded check.
    pub ground_dist: f32,
    /// Steepest slope (degrees) that still counts as ground.
    pub max_walking_angle: f32,
    /// Exponent of the bounce attenuation curve.
    pub angle_power: f32,
    /// Angle (degrees) past which a hit attenuates as a full wall.
    pub max_angle_shove: f32,
    /// Numerical slack for the sweep loop and push-out nudges.
    pub epsilon: f32,
    /// Iteration cap for the sweep-and-slide loop.
    pub max_bounces: u32,

    // ── Impulses ─────────────────────────────────────────────────────
    pub jump_power: f32,
    /// (forward, up) impulse for a dive; .y also powers the dive-exit jump.
    pub dive_power: Vec2,
    /// (forward, up) boost for obstacle-chained dives.
    pub diving_jump_power: Vec2,
    /// (forward, up) impulse for the crouch-slide chain.
    pub sliding_power: Vec2,

    // ── Timing windows ───────────────────────────────────────────────
    pub chain_action_buffer: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    /// Minimum interval between two recorded presses of the same action.
    pub reuse_delay: f32,
    /// Continuous grounded-while-diving time before the dive becomes a slide.
    pub ragdoll_delay: f32,
    /// Settle speed below which a ragdolled player may recover.
    pub ragdoll_control_speed: f32,

    // ── Dive pose & obstacle probe ───────────────────────────────────
    /// Degrees per second of dive-lean change.
    pub dive_angle_speed: f32,
    pub max_dive_angle: f32,
    /// Downward pitch (degrees) of the handprint probe while diving.
    pub max_dive_camera_angle: f32,
    /// Reach of the obstacle probe.
    pub arm_length: f32,
    /// Distance under which the handprint cue shows at full strength.
    pub fade_arm_length: f32,

    // ── Capsule ──────────────────────────────────────────────────────
    /// Head-anchor offset the capsule hangs from.
    pub anchor_offset: f32,
    pub full_height: f32,
    pub tucked_height: f32,
    pub radius: f32,
    /// Height regained per second when standing back up.
    pub standup_speed: f32,

    // ── Forces & drags ───────────────────────────────────────────────
    /// Downward acceleration (negative).
    pub gravity: f32,
    pub dive_drag: f32,
    /// Extra dive drag applied when not steering with the dive.
    pub added_dive_drag: f32,
    pub slide_drag: f32,

    // ── Landing impact ───────────────────────────────────────────────
    /// Landings slower than this leave no impact squash.
    pub min_impact_velocity: f32,
    /// Landings faster than this force the ragdoll.
    pub max_impact_velocity: f32,
    /// Recovery rate of the landing squash (m/s per second).
    pub impact_recovery: f32,
    /// Scale from landing speed to height squash.
    pub impact_to_height: f32,

    /// Height below which the character has fallen out of the world.
    pub void_level: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.002,

            max_speed: 7.5,
            run_acceleration: 50.0,
            run_deceleration: 30.0,
            max_walk_speed: 4.0,
            walk_deceleration: 30.0,

            ground_dist: 0.01,
            max_walking_angle: 60.0,
            angle_power: 0.5,
            max_angle_shove: 60.0,
            epsilon: 0.001,
            max_bounces: 5,

            jump_power: 7.0,
            dive_power: Vec2::new(5.0, 5.0),
            diving_jump_power: Vec2::new(5.0, 7.0),
            sliding_power: Vec2::new(5.0, 0.0),

            chain_action_buffer: 0.05,
            coyote_time: 0.05,
            jump_buffer_time: 0.1,
            reuse_delay: 0.2,
            ragdoll_delay: 0.2,
            ragdoll_control_speed: 5.0,

            dive_angle_speed: 10.0,
            max_dive_angle: 90.0,
            max_dive_camera_angle: 45.0,
            arm_length: 1.5,
            fade_arm_length: 1.0,

            anchor_offset: -1.5,
            full_height: 2.0,
            tucked_height: 1.0,
            radius: 0.5,
            standup_speed: 0.5,

            gravity: -25.0,
            dive_drag: 5.0,
            added_dive_drag: 0.1,
            slide_drag: 3.0,

            min_impact_velocity: 1.0,
            max_impact_velocity: 10.0,
            impact_recovery: 1.0,
            impact_to_height: 1.0,

            void_level: -20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = MovementConfig::default();
        assert!(cfg.tucked_height < cfg.full_height);
        assert!(cfg.fade_arm_length < cfg.arm_length);
        assert!(cfg.min_impact_velocity < cfg.max_impact_velocity);
        assert!(cfg.gravity < 0.0);
        assert!(cfg.max_bounces > 0);
    }
}
