//! Action rules: jumping, diving, chained moves off obstacles, the
//! crouch-slide and ragdoll recovery. Evaluated once per tick between the
//! grounding pass and the velocity integration.

use glam::{Vec2, Vec3};

use crate::config::MovementConfig;
use crate::controller::{Cue, TickEvent};
use crate::motion::{Mode, MotionState};
use crate::world::{RagdollBridge, ShapeCaster};

/// Drops the character into the ragdoll, handing its momentum to the bridge.
pub(crate) fn enter_ragdoll(
    state: &mut MotionState,
    bridge: &mut dyn RagdollBridge,
    events: &mut Vec<TickEvent>,
    impulse: Vec3,
) {
    state.mode = Mode::Ragdoll;
    state.dive_velocity = Vec2::ZERO;
    state.slide_velocity = Vec2::ZERO;
    state.time_diving_grounded = 0.0;
    state.time_since_dive_ready = f32::INFINITY;
    bridge.enable(impulse);
    events.push(TickEvent::RagdollEnabled { impulse });
}

pub(crate) fn handle_actions(
    state: &mut MotionState,
    cfg: &MovementConfig,
    caster: &dyn ShapeCaster,
    ragdoll: &mut dyn RagdollBridge,
    events: &mut Vec<TickEvent>,
    crouch_held: bool,
    dt: f32,
) {
    state.handprint_fade = 0.0;
    let forward = state.pose.forward();

    if state.mode != Mode::Ragdoll {
        // Mid-dive, probe ahead for an obstacle to push off from.
        if state.mode == Mode::Diving {
            let pitch = cfg.max_dive_camera_angle.to_radians();
            let probe_dir = forward * pitch.cos() - Vec3::Y * pitch.sin();
            let origin = state.pose.position + state.capsule.center;
            if let Some(hit) = caster.cast_ray(origin, probe_dir, cfg.arm_length) {
                state.time_since_dive_ready = 0.0;
                state.handprint_fade = if hit.distance < cfg.fade_arm_length {
                    1.0
                } else {
                    1.0 - (hit.distance - cfg.fade_arm_length)
                        / (cfg.arm_length - cfg.fade_arm_length)
                };
            } else {
                state.time_since_dive_ready += dt;
            }
        }

        let forward_planar = state.pose.forward_planar();
        let attempting_jump = state.time_since_jump_pressed <= cfg.jump_buffer_time;
        let obstacle_ready = state.time_since_dive_ready <= cfg.coyote_time;

        if attempting_jump
            && state.mode.is_upright()
            && state.time_since_grounded <= cfg.coyote_time
        {
            // Plain grounded (or coyote) jump.
            state.vertical_velocity += cfg.jump_power;
            state.time_since_jump = 0.0;
            state.time_since_grounded = 0.0;
            state.time_since_jump_pressed = f32::INFINITY;
        } else if attempting_jump
            && state.mode.is_tucked()
            && state.time_since_dive_entered <= cfg.chain_action_buffer
            && state.time_since_grounded <= cfg.chain_action_buffer + cfg.coyote_time
        {
            // Jump buffered right behind a ground dive still fires.
            state.vertical_velocity += cfg.jump_power;
            state.time_since_jump = 0.0;
            state.time_since_jump_pressed = f32::INFINITY;
        } else if attempting_jump
            && state.mode == Mode::Diving
            && state.time_since_dive_entered > cfg.chain_action_buffer
            && obstacle_ready
        {
            // Push off the obstacle and leave the dive.
            state.vertical_velocity += cfg.dive_power.y;
            state.time_since_jump = 0.0;
            state.time_since_jump_pressed = f32::INFINITY;
            state.time_since_dive_exited = 0.0;
            state.mode = Mode::Airborne;
            events.push(TickEvent::Cue(Cue::Push));
        }

        let attempting_dive = state.time_since_dive_pressed <= cfg.jump_buffer_time;

        if attempting_dive
            && state.mode.is_upright()
            && state.time_since_jump > cfg.chain_action_buffer
            && state.time_since_grounded <= cfg.coyote_time
        {
            // Dive off the ground.
            state.dive_velocity += forward_planar * cfg.dive_power.x;
            state.time_since_dive_entered = 0.0;
            state.time_since_grounded = 0.0;
            state.time_since_dive_pressed = f32::INFINITY;
            state.mode = Mode::Diving;
        } else if attempting_dive
            && state.mode.is_upright()
            && state.time_since_jump <= cfg.chain_action_buffer
            && state.time_since_grounded <= cfg.chain_action_buffer + cfg.coyote_time
        {
            // Dive buffered right behind a jump.
            state.dive_velocity += forward_planar * cfg.dive_power.x;
            state.time_since_dive_entered = 0.0;
            state.time_since_dive_pressed = f32::INFINITY;
            state.mode = Mode::Diving;
        } else if attempting_dive
            && state.mode == Mode::Diving
            && state.time_since_dive_entered > cfg.chain_action_buffer
            && obstacle_ready
        {
            // Push off the obstacle and keep diving, boosted.
            state.vertical_velocity += cfg.diving_jump_power.y;
            state.dive_velocity += forward_planar * cfg.diving_jump_power.x;
            state.time_since_dive_entered = 0.0;
            state.time_since_dive_pressed = f32::INFINITY;
            events.push(TickEvent::Cue(Cue::Push));
        } else if attempting_dive
            && state.time_since_dive_exited <= cfg.chain_action_buffer
            && state.time_since_dive_entered > cfg.chain_action_buffer
            && obstacle_ready
            && state.mode != Mode::Sliding
        {
            // Boost buffered right behind an obstacle dive-exit jump.
            state.vertical_velocity += cfg.diving_jump_power.y;
            state.dive_velocity += forward_planar * cfg.diving_jump_power.x;
            state.time_since_dive_pressed = f32::INFINITY;
            events.push(TickEvent::Cue(Cue::Push));
        }

        // Crouch buffered right behind a ground dive turns it into a slide.
        let attempting_slide = state.time_since_crouch_pressed <= cfg.jump_buffer_time;
        if attempting_slide
            && state.mode.is_tucked()
            && state.time_since_dive_entered <= cfg.chain_action_buffer
            && state.time_since_grounded <= cfg.chain_action_buffer + cfg.coyote_time
        {
            state.vertical_velocity = -cfg.dive_power.y;
            state.dive_velocity += forward_planar * cfg.sliding_power.x;
            state.time_since_crouch_pressed = f32::INFINITY;
            state.slide_velocity = state.run_velocity + state.dive_velocity;
            state.mode = Mode::Sliding;
            events.push(TickEvent::StartedSliding);
        }

        // A buffered jump ends the slide; the press is deliberately left
        // unconsumed so it can still fire as a jump once upright.
        if state.mode == Mode::Sliding && attempting_jump {
            state.mode = if state.time_since_grounded == 0.0 {
                Mode::Grounded
            } else {
                Mode::Airborne
            };
            state.time_diving_grounded = 0.0;
        }

        state.crouching = crouch_held;
    } else {
        // Ragdoll recovery: jump once the rig has settled.
        let attempting_jump = state.time_since_jump_pressed <= cfg.jump_buffer_time;
        if attempting_jump && ragdoll.settle_speed() < cfg.ragdoll_control_speed {
            ragdoll.disable();
            state.mode = Mode::Grounded;
            events.push(TickEvent::RagdollDisabled);
        }
    }

    // Lean into the dive, recover when upright.
    if state.mode.is_tucked() {
        state.dive_angle += cfg.dive_angle_speed * dt;
    } else if state.mode != Mode::Ragdoll {
        state.dive_angle -= cfg.dive_angle_speed * dt;
    }
    state.dive_angle = state.dive_angle.clamp(0.0, cfg.max_dive_angle);

    // Air friction on the dive channel.
    if state.dive_velocity.length() > 0.0 {
        state.dive_velocity = crate::drag::apply_drag(state.dive_velocity, cfg.dive_drag, dt);
    }

    state.advance_action_timers(dt);
}
