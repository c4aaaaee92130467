//! Mutable locomotion state for one character: pose, velocity channels,
//! capsule, action mode and the timer battery the action rules read.

use engine_core::pose::Pose;
use glam::{Vec2, Vec3};

use crate::config::MovementConfig;
use crate::controller::TickInput;
use crate::world::Capsule;

/// What the character is currently doing. Exactly one mode holds per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Grounded,
    Airborne,
    Diving,
    Sliding,
    Ragdoll,
}

impl Mode {
    /// Diving or sliding, the two tucked modes.
    pub fn is_tucked(self) -> bool {
        matches!(self, Mode::Diving | Mode::Sliding)
    }

    /// Grounded or airborne, the two upright player-steered modes.
    pub fn is_upright(self) -> bool {
        matches!(self, Mode::Grounded | Mode::Airborne)
    }
}

/// Full per-character locomotion state. Timers count up; a timer at
/// `f32::INFINITY` means the event never happened or was consumed.
#[derive(Debug, Clone)]
pub struct MotionState {
    pub pose: Pose,
    pub mode: Mode,
    pub capsule: Capsule,

    /// Vertical speed, positive up.
    pub vertical_velocity: f32,
    /// Player-steered planar velocity.
    pub run_velocity: Vec2,
    /// Impulse-driven planar velocity from dives and boosts.
    pub dive_velocity: Vec2,
    /// Frozen planar velocity while sliding.
    pub slide_velocity: Vec2,

    pub crouching: bool,
    /// Negative landing speed still to be recovered as height squash.
    pub landing_velocity: f32,
    /// Current dive lean in degrees.
    pub dive_angle: f32,
    /// Strength of the handprint cue, 0 when not probing an obstacle.
    pub handprint_fade: f32,
    /// Last position at which the ground check passed.
    pub last_grounded_position: Vec3,

    pub time_since_grounded: f32,
    pub time_since_jump: f32,
    pub time_since_dive_entered: f32,
    pub time_since_dive_exited: f32,
    pub time_since_jump_pressed: f32,
    pub time_since_dive_pressed: f32,
    pub time_since_crouch_pressed: f32,
    pub time_since_dive_ready: f32,
    /// Continuous grounded time while tucked; gates slide entry.
    pub time_diving_grounded: f32,
}

impl MotionState {
    pub fn new(position: Vec3, yaw: f32, cfg: &MovementConfig) -> Self {
        let capsule = Capsule {
            height: cfg.full_height,
            radius: cfg.radius,
            center: Vec3::new(
                0.0,
                Capsule::center_y_for(cfg.full_height, cfg.anchor_offset, cfg.full_height),
                0.0,
            ),
        };
        Self {
            pose: Pose { position, yaw },
            mode: Mode::Airborne,
            capsule,
            vertical_velocity: 0.0,
            run_velocity: Vec2::ZERO,
            dive_velocity: Vec2::ZERO,
            slide_velocity: Vec2::ZERO,
            crouching: false,
            landing_velocity: 0.0,
            dive_angle: 0.0,
            handprint_fade: 0.0,
            last_grounded_position: position,
            time_since_grounded: 0.0,
            time_since_jump: f32::INFINITY,
            time_since_dive_entered: f32::INFINITY,
            time_since_dive_exited: f32::INFINITY,
            time_since_jump_pressed: f32::INFINITY,
            time_since_dive_pressed: f32::INFINITY,
            time_since_crouch_pressed: f32::INFINITY,
            time_since_dive_ready: f32::INFINITY,
            time_diving_grounded: 0.0,
        }
    }

    /// Drops all motion and timers but keeps the pose. Used on respawn.
    pub fn reset(&mut self, position: Vec3, yaw: f32, cfg: &MovementConfig) {
        *self = MotionState::new(position, yaw, cfg);
    }

    /// Zeroes the pressed-timers for actions pressed this tick, gated by the
    /// reuse delay so a mashed key cannot re-arm a just-consumed buffer.
    pub fn record_presses(&mut self, input: &TickInput, reuse_delay: f32) {
        if input.jump_pressed && self.time_since_jump_pressed >= reuse_delay {
            self.time_since_jump_pressed = 0.0;
        }
        if input.dive_pressed && self.time_since_dive_pressed >= reuse_delay {
            self.time_since_dive_pressed = 0.0;
        }
        if input.crouch_pressed && self.time_since_crouch_pressed >= reuse_delay {
            self.time_since_crouch_pressed = 0.0;
        }
    }

    /// Advances every action timer by `dt`. Infinity stays infinity.
    pub fn advance_action_timers(&mut self, dt: f32) {
        self.time_since_jump += dt;
        self.time_since_dive_entered += dt;
        self.time_since_dive_exited += dt;
        self.time_since_jump_pressed += dt;
        self.time_since_dive_pressed += dt;
        self.time_since_crouch_pressed += dt;
    }

    /// Sets the capsule height, clamped to the configured range, and
    /// recomputes the center so the capsule keeps hanging from the anchor.
    pub fn set_height(&mut self, height: f32, cfg: &MovementConfig) {
        let h = height.clamp(cfg.tucked_height, cfg.full_height);
        self.capsule.height = h;
        self.capsule.center.y = Capsule::center_y_for(h, cfg.anchor_offset, cfg.full_height);
    }

    /// A tackle only connects while tucked (diving or sliding).
    pub fn can_tackle(&self) -> bool {
        self.mode.is_tucked()
    }
}
