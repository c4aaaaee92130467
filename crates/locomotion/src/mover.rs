//! Sweep-and-slide capsule mover. The capsule is swept along the frame's
//! displacement; each hit attenuates and redirects the leftover along the
//! contact plane until the budget is spent or the bounce cap is reached.

use glam::Vec3;

use crate::config::MovementConfig;
use crate::world::{Capsule, ShapeCaster, SurfaceTag};

/// One surface touched during a sweep, with the velocity it was hit at.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub surface: SurfaceTag,
    pub point: Vec3,
    pub normal: Vec3,
    pub velocity: Vec3,
}

/// Outcome of one sweep-and-slide pass.
#[derive(Debug, Clone)]
pub struct MoveResult {
    pub position: Vec3,
    pub contacts: Vec<Contact>,
    pub bounces: u32,
}

/// Result of the downward grounded probe.
#[derive(Debug, Clone, Copy)]
pub struct GroundHit {
    pub normal: Vec3,
    pub surface: SurfaceTag,
    /// Whether the surface is shallow enough to stand on.
    pub walkable: bool,
}

/// Sweeps `capsule` from `start` along `displacement`, sliding along
/// whatever it hits. `dt` only feeds the contact velocities.
pub fn move_capsule(
    caster: &dyn ShapeCaster,
    capsule: &Capsule,
    start: Vec3,
    displacement: Vec3,
    dt: f32,
    cfg: &MovementConfig,
) -> MoveResult {
    let mut position = start;
    let mut remaining = displacement;
    let mut contacts = Vec::new();
    let mut bounces = 0;

    while bounces < cfg.max_bounces && remaining.length() > cfg.epsilon {
        let dist = remaining.length();
        let dir = remaining / dist;
        let Some(hit) = caster.cast_capsule(capsule, position, dir, dist) else {
            position += remaining;
            break;
        };
        contacts.push(Contact {
            surface: hit.surface,
            point: hit.point,
            normal: hit.normal,
            velocity: displacement / dt,
        });
        if hit.distance <= 0.0 {
            // Started overlapping; let the next frame's nudges resolve it.
            break;
        }

        position += dir * hit.distance + hit.normal * (2.0 * cfg.epsilon);
        let fraction = hit.distance / dist;
        remaining *= 1.0 - fraction;

        // Grazing hits keep most of their momentum, head-on hits almost none.
        let incidence = (hit.normal.angle_between(remaining).to_degrees() - 90.0)
            .abs()
            .min(cfg.max_angle_shove)
            / cfg.max_angle_shove;
        remaining *= (1.0 - incidence).powf(cfg.angle_power) * 0.9 + 0.1;

        // Redirect along the contact plane at preserved magnitude. A
        // degenerate projection (dead-on hit) falls back to the horizontal
        // plane so the leftover still has a direction.
        let target_len = remaining.length();
        let projected = remaining.reject_from_normalized(hit.normal).normalize_or_zero() * target_len;
        remaining = if projected.length() + cfg.epsilon < target_len {
            Vec3::new(remaining.x, 0.0, remaining.z).normalize_or_zero() * target_len
        } else {
            projected
        };
        bounces += 1;
    }

    MoveResult {
        position,
        contacts,
        bounces,
    }
}

/// Probes straight down by `ground_dist` and classifies the surface.
pub fn check_grounded(
    caster: &dyn ShapeCaster,
    capsule: &Capsule,
    position: Vec3,
    cfg: &MovementConfig,
) -> Option<GroundHit> {
    let hit = caster.cast_capsule(capsule, position, Vec3::NEG_Y, cfg.ground_dist)?;
    let walkable = hit.normal.angle_between(Vec3::Y).to_degrees() < cfg.max_walking_angle;
    Some(GroundHit {
        normal: hit.normal,
        surface: hit.surface,
        walkable,
    })
}
