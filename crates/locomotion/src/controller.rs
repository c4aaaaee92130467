//! The per-tick pipeline for one character: ground the capsule, settle the
//! landing impact, run the action rules, integrate the velocity channels and
//! sweep the capsule through the world.

use engine_core::pose::planar_to_world;
use glam::{Vec2, Vec3};
use log::debug;

use crate::actions;
use crate::config::MovementConfig;
use crate::drag::apply_drag;
use crate::height;
use crate::motion::{Mode, MotionState};
use crate::mover::{check_grounded, move_capsule, Contact};
use crate::world::{RagdollBridge, ShapeCaster, SurfaceTag};

/// One tick's worth of input, sampled by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Local (strafe, forward) axis, unnormalized.
    pub move_axis: Vec2,
    /// Look delta in input counts; x turns the body.
    pub look_delta: Vec2,
    pub jump_pressed: bool,
    pub dive_pressed: bool,
    pub crouch_pressed: bool,
    pub crouch_held: bool,
}

/// Presentation cue with no simulation effect of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Pushed off an obstacle mid-dive.
    Push,
}

/// Discrete things that happened during a tick. Replicated to observers and
/// consumed by the game layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    Cue(Cue),
    RagdollEnabled { impulse: Vec3 },
    RagdollDisabled,
    StartedSliding,
    FellBelowVoid,
}

/// Everything a tick produced besides the new state.
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub events: Vec<TickEvent>,
    /// Surface under the capsule this tick, if any, regardless of slope.
    pub grounded_surface: Option<SurfaceTag>,
    /// Surfaces the sweep ran into.
    pub contacts: Vec<Contact>,
}

/// Owns one character's locomotion state and advances it tick by tick.
pub struct CharacterController {
    config: MovementConfig,
    state: MotionState,
}

impl CharacterController {
    pub fn new(position: Vec3, yaw: f32, config: MovementConfig) -> Self {
        let state = MotionState::new(position, yaw, &config);
        Self { config, state }
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn can_tackle(&self) -> bool {
        self.state.can_tackle()
    }

    /// Where to respawn after a void fall.
    pub fn last_grounded_position(&self) -> Vec3 {
        self.state.last_grounded_position
    }

    /// Drops motion and timers and moves the character, keeping its config.
    pub fn reset(&mut self, position: Vec3, yaw: f32) {
        self.state.reset(position, yaw, &self.config);
    }

    /// Forces the ragdoll from outside the tick, e.g. a tackle. No-op when
    /// already ragdolled, so replays of the same hit are harmless.
    pub fn force_ragdoll(
        &mut self,
        ragdoll: &mut dyn RagdollBridge,
        impulse: Vec3,
    ) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if self.state.mode != Mode::Ragdoll {
            actions::enter_ragdoll(&mut self.state, ragdoll, &mut events, impulse);
        }
        events
    }

    /// Moves the character without touching velocities or timers. Used when
    /// control comes back from a ragdoll rig at its rest position.
    pub fn relocate(&mut self, position: Vec3) {
        self.state.pose.position = position;
    }

    /// Applies a replicated ragdoll-off event. Idempotent.
    pub fn apply_ragdoll_disabled(&mut self, ragdoll: &mut dyn RagdollBridge) {
        if self.state.mode == Mode::Ragdoll {
            ragdoll.disable();
            self.state.mode = Mode::Grounded;
        }
    }

    pub fn tick(
        &mut self,
        input: &TickInput,
        caster: &dyn ShapeCaster,
        ragdoll: &mut dyn RagdollBridge,
        dt: f32,
    ) -> TickOutput {
        let cfg = &self.config;
        let state = &mut self.state;
        let mut out = TickOutput::default();

        state.record_presses(input, cfg.reuse_delay);

        if state.mode != Mode::Ragdoll {
            state.pose.yaw -= input.look_delta.x * cfg.mouse_sensitivity;
        }
        let move_dir = state.pose.rotate_input(input.move_axis).clamp_length_max(1.0);

        // ── Ground the capsule ───────────────────────────────────────
        let ground = check_grounded(caster, &state.capsule, state.pose.position, cfg);
        if let Some(hit) = ground {
            out.grounded_surface = Some(hit.surface);
        }
        let grounded = ground.is_some_and(|hit| hit.walkable);

        if !grounded {
            state.vertical_velocity += cfg.gravity * dt;
            if state.mode != Mode::Sliding {
                state.time_diving_grounded = 0.0;
            }
            state.time_since_grounded += dt;
        } else {
            state.last_grounded_position = state.pose.position;
            let impact = -state.vertical_velocity;
            if state.time_since_grounded > 0.0
                && impact >= cfg.min_impact_velocity
                && impact <= cfg.max_impact_velocity
            {
                state.landing_velocity = state.vertical_velocity;
                debug!("landing at {impact:.2} m/s");
            } else if impact > cfg.max_impact_velocity {
                debug!("landing at {impact:.2} m/s, too hard to stay up");
                actions::enter_ragdoll(state, ragdoll, &mut out.events, Vec3::NEG_Y);
            }
            state.vertical_velocity = 0.0;
            state.time_since_grounded = 0.0;
            if state.mode.is_tucked() {
                state.time_diving_grounded += dt;
            }
        }
        if state.mode.is_upright() {
            state.mode = if grounded { Mode::Grounded } else { Mode::Airborne };
        }

        height::landing_squash_and_standup(state, cfg, caster, dt);

        // ── Slide entry ──────────────────────────────────────────────
        if state.time_diving_grounded >= cfg.ragdoll_delay && state.mode != Mode::Sliding {
            let carried = state.run_velocity + state.dive_velocity;
            // A hard dive landing bleeds speed out of the slide.
            let denom = carried.length() - state.landing_velocity;
            let bleed = if denom <= f32::EPSILON {
                0.0
            } else {
                (carried.length() / denom).clamp(0.0, 1.0)
            };
            state.slide_velocity = carried * bleed;
            state.mode = Mode::Sliding;
            debug!("sliding at {:.2} m/s", state.slide_velocity.length());
            out.events.push(TickEvent::StartedSliding);
        }

        actions::handle_actions(state, cfg, caster, ragdoll, &mut out.events, input.crouch_held, dt);
        height::tuck_if_diving(state, cfg);

        // ── Velocity channels ────────────────────────────────────────
        let decel = if state.crouching {
            cfg.walk_deceleration
        } else {
            cfg.run_deceleration
        };
        state.run_velocity = apply_drag(state.run_velocity, decel, dt);

        if input.move_axis.length() > 0.0 && state.mode != Mode::Ragdoll {
            state.run_velocity += move_dir * cfg.run_acceleration * dt;
            let cap = if state.crouching {
                cfg.max_walk_speed
            } else {
                cfg.max_speed
            };
            if state.run_velocity.length() > cap {
                state.run_velocity = state.run_velocity.normalize() * cap;
            }
        }

        // Steering away from the dive kills it; steering off-axis drags it.
        if state.dive_velocity.length() > 0.0 {
            let along = state.dive_velocity.normalize().dot(move_dir);
            state.dive_velocity = if along >= 0.0 {
                apply_drag(state.dive_velocity, (1.0 - along) * cfg.added_dive_drag, dt)
            } else {
                Vec2::ZERO
            };
        }

        let planar = if state.mode == Mode::Sliding {
            state.slide_velocity = apply_drag(state.slide_velocity, cfg.slide_drag, dt);
            state.landing_velocity = 0.0;
            state.slide_velocity
        } else {
            state.run_velocity + state.dive_velocity
        };

        // ── Sweep ────────────────────────────────────────────────────
        let displacement = planar_to_world(planar, state.vertical_velocity) * dt;
        let moved = move_capsule(caster, &state.capsule, state.pose.position, displacement, dt, cfg);
        state.pose.position = moved.position;
        out.contacts = moved.contacts;

        if state.pose.position.y <= cfg.void_level {
            state.vertical_velocity = 0.0;
            state.landing_velocity = 0.0;
            out.events.push(TickEvent::FellBelowVoid);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_world::PlaneWorld;
    use crate::world::NullRagdoll;

    const DT: f32 = 0.02;

    fn resting_controller() -> CharacterController {
        // capsule bottom exactly on the floor at y = 0
        CharacterController::new(Vec3::new(0.0, 1.5, 0.0), 0.0, MovementConfig::default())
    }

    fn run(
        ctl: &mut CharacterController,
        world: &PlaneWorld,
        input: &TickInput,
        ticks: u32,
    ) -> Vec<TickEvent> {
        let mut ragdoll = NullRagdoll::default();
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(ctl.tick(input, world, &mut ragdoll, DT).events);
        }
        events
    }

    #[test]
    fn run_speed_caps_at_max() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let forward = TickInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..TickInput::default()
        };
        run(&mut ctl, &world, &forward, 100);
        let speed = ctl.state().run_velocity.length();
        assert!((speed - ctl.config().max_speed).abs() < 1e-3);
        // yaw 0 runs toward -z
        assert!(ctl.state().pose.position.z < -5.0);
        assert_eq!(ctl.state().mode, Mode::Grounded);

        // releasing the stick drags the run back to zero
        run(&mut ctl, &world, &TickInput::default(), 50);
        assert_eq!(ctl.state().run_velocity, Vec2::ZERO);
    }

    #[test]
    fn crouch_walk_caps_lower() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let creep = TickInput {
            move_axis: Vec2::new(0.0, 1.0),
            crouch_held: true,
            ..TickInput::default()
        };
        run(&mut ctl, &world, &creep, 100);
        let speed = ctl.state().run_velocity.length();
        assert!((speed - ctl.config().max_walk_speed).abs() < 1e-3);
    }

    #[test]
    fn grounded_jump_launches() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let jump = TickInput {
            jump_pressed: true,
            ..TickInput::default()
        };
        run(&mut ctl, &world, &jump, 1);
        assert_eq!(ctl.state().vertical_velocity, ctl.config().jump_power);
        // airborne on the next tick
        run(&mut ctl, &world, &TickInput::default(), 1);
        assert_eq!(ctl.state().mode, Mode::Airborne);
    }

    #[test]
    fn buffered_jump_fires_on_landing_with_impact_squash() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl =
            CharacterController::new(Vec3::new(0.0, 2.0, 0.0), 0.0, MovementConfig::default());
        // fall long enough to leave the spawn coyote window
        run(&mut ctl, &world, &TickInput::default(), 9);
        assert_eq!(ctl.state().mode, Mode::Airborne);
        // press jump just before touchdown
        let jump = TickInput {
            jump_pressed: true,
            ..TickInput::default()
        };
        run(&mut ctl, &world, &jump, 1);
        run(&mut ctl, &world, &TickInput::default(), 1);
        // the landing consumed the buffered press and captured the impact
        assert_eq!(ctl.state().vertical_velocity, ctl.config().jump_power);
        assert!(ctl.state().landing_velocity < 0.0);
        assert!(ctl.state().capsule.height < ctl.config().full_height);
    }

    #[test]
    fn dive_tucks_and_turns_into_slide() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let dive = TickInput {
            dive_pressed: true,
            ..TickInput::default()
        };
        run(&mut ctl, &world, &dive, 1);
        assert_eq!(ctl.state().mode, Mode::Diving);
        assert_eq!(ctl.state().capsule.height, ctl.config().tucked_height);
        assert!(ctl.state().dive_velocity.y < 0.0); // forward at yaw 0 is -z
        assert!(ctl.can_tackle());

        // tucking shortens the capsule from the bottom, so the dive drops,
        // lands, and after the grounded delay becomes a slide
        let events = run(&mut ctl, &world, &TickInput::default(), 60);
        assert!(events.contains(&TickEvent::StartedSliding));
        assert_eq!(ctl.state().mode, Mode::Sliding);
    }

    #[test]
    fn jump_exits_the_slide_then_fires() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let dive = TickInput {
            dive_pressed: true,
            ..TickInput::default()
        };
        run(&mut ctl, &world, &dive, 1);
        run(&mut ctl, &world, &TickInput::default(), 60);
        assert_eq!(ctl.state().mode, Mode::Sliding);

        let jump = TickInput {
            jump_pressed: true,
            ..TickInput::default()
        };
        run(&mut ctl, &world, &jump, 1);
        assert!(ctl.state().mode.is_upright());
        // the press was not consumed by the slide exit; it jumps next tick
        run(&mut ctl, &world, &TickInput::default(), 1);
        assert!(ctl.state().vertical_velocity > 0.0);
    }

    #[test]
    fn hard_landing_ragdolls_and_jump_recovers() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl =
            CharacterController::new(Vec3::new(0.0, 5.0, 0.0), 0.0, MovementConfig::default());
        let events = run(&mut ctl, &world, &TickInput::default(), 40);
        assert!(events
            .iter()
            .any(|e| matches!(e, TickEvent::RagdollEnabled { .. })));
        assert_eq!(ctl.state().mode, Mode::Ragdoll);
        // a ragdolled player cannot steer
        let forward = TickInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..TickInput::default()
        };
        run(&mut ctl, &world, &forward, 5);
        assert_eq!(ctl.state().run_velocity, Vec2::ZERO);

        let jump = TickInput {
            jump_pressed: true,
            ..TickInput::default()
        };
        let events = run(&mut ctl, &world, &jump, 1);
        assert!(events.contains(&TickEvent::RagdollDisabled));
        assert_eq!(ctl.state().mode, Mode::Grounded);
    }

    #[test]
    fn tackle_forces_ragdoll_once() {
        let mut ctl = resting_controller();
        let mut ragdoll = NullRagdoll::default();
        let hit = Vec3::new(3.0, 1.0, 0.0);
        let events = ctl.force_ragdoll(&mut ragdoll, hit);
        assert_eq!(events, vec![TickEvent::RagdollEnabled { impulse: hit }]);
        assert_eq!(ctl.state().mode, Mode::Ragdoll);
        // replaying the same hit is a no-op
        assert!(ctl.force_ragdoll(&mut ragdoll, hit).is_empty());
    }

    #[test]
    fn void_fall_reports_and_clears_velocity() {
        let world = PlaneWorld::floor(-100.0);
        let mut ctl = resting_controller();
        let events = run(&mut ctl, &world, &TickInput::default(), 80);
        assert!(events.contains(&TickEvent::FellBelowVoid));
    }

    #[test]
    fn look_turns_the_body() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let look = TickInput {
            look_delta: Vec2::new(10.0, 0.0),
            ..TickInput::default()
        };
        run(&mut ctl, &world, &look, 1);
        let expected = -10.0 * ctl.config().mouse_sensitivity;
        assert!((ctl.state().pose.yaw - expected).abs() < 1e-6);
    }

    #[test]
    fn grounded_surface_is_reported() {
        let world = PlaneWorld::floor(0.0).with_floor_tag(SurfaceTag(7));
        let mut ctl = resting_controller();
        let mut ragdoll = NullRagdoll::default();
        let out = ctl.tick(&TickInput::default(), &world, &mut ragdoll, DT);
        assert_eq!(out.grounded_surface, Some(SurfaceTag(7)));
    }

    #[test]
    fn stale_grounding_does_not_allow_a_jump() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = CharacterController::new(
            Vec3::new(0.0, 8.0, 0.0),
            0.0,
            MovementConfig::default(),
        );
        // 0.2 s airborne, well past the coyote window.
        run(&mut ctl, &world, &TickInput::default(), 10);
        assert!(ctl.state().time_since_grounded > ctl.config().coyote_time);
        let jump = TickInput {
            jump_pressed: true,
            ..TickInput::default()
        };
        run(&mut ctl, &world, &jump, 1);
        assert!(ctl.state().vertical_velocity < 0.0);
        assert_ne!(ctl.state().mode, Mode::Ragdoll);
    }

    #[test]
    fn impact_just_under_the_cap_lands_upright() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let cap = ctl.config().max_impact_velocity;
        ctl.state.mode = Mode::Airborne;
        ctl.state.time_since_grounded = 0.4;
        ctl.state.vertical_velocity = -(cap - 0.01);
        let mut ragdoll = NullRagdoll::default();
        let out = ctl.tick(&TickInput::default(), &world, &mut ragdoll, DT);
        assert_ne!(ctl.state().mode, Mode::Ragdoll);
        // landing velocity captured (and already recovering toward zero)
        assert!(ctl.state().landing_velocity < -(cap - 0.1));
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::RagdollEnabled { .. })));
    }

    #[test]
    fn impact_just_over_the_cap_ragdolls() {
        let world = PlaneWorld::floor(0.0);
        let mut ctl = resting_controller();
        let cap = ctl.config().max_impact_velocity;
        ctl.state.mode = Mode::Airborne;
        ctl.state.time_since_grounded = 0.4;
        ctl.state.vertical_velocity = -(cap + 0.01);
        let mut ragdoll = NullRagdoll::default();
        let out = ctl.tick(&TickInput::default(), &world, &mut ragdoll, DT);
        assert_eq!(ctl.state().mode, Mode::Ragdoll);
        assert!(out
            .events
            .contains(&TickEvent::RagdollEnabled { impulse: Vec3::NEG_Y }));
    }
}
