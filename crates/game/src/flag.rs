//! The flag: a capsule that falls, snaps to ground, and gets carried.
//!
//! A free flag runs its own tiny drop simulation so that a flag dropped
//! mid-air (tackled carrier) settles onto whatever is below it. A carried
//! flag has no collider; it just follows its carrier. Attachment goes
//! through an [`AuthorityToken`] so two divers hitting the flag on the same
//! tick resolve to a single carrier.

use crate::authority::{AuthorityToken, PlayerId};
use crate::level;
use crate::team::Team;
use glam::Vec3;
use locomotion::{Capsule, ShapeCaster};
use log::debug;
use physics::{ColliderHandle, PhysicsWorld};

const FLAG_HEIGHT: f32 = 1.0;
const FLAG_RADIUS: f32 = 0.15;
/// How far above a surface the pole base rests.
const GROUND_CLEARANCE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    Free,
    Carried(PlayerId),
}

pub struct Flag {
    pub team: Team,
    spawn: Vec3,
    position: Vec3,
    vertical_velocity: f32,
    state: FlagState,
    authority: AuthorityToken,
    collider: Option<ColliderHandle>,
}

impl Flag {
    /// Place a flag `respawn_height` above its base so it drops in visibly.
    pub fn new(world: &mut PhysicsWorld, team: Team, base: Vec3, respawn_height: f32) -> Self {
        let spawn = base + Vec3::Y * respawn_height;
        let collider = world.add_capsule(spawn, &Self::capsule(), level::flag_tag(team));
        Self {
            team,
            spawn,
            position: spawn,
            vertical_velocity: 0.0,
            state: FlagState::Free,
            authority: AuthorityToken::new(),
            collider: Some(collider),
        }
    }

    fn capsule() -> Capsule {
        Capsule {
            height: FLAG_HEIGHT,
            radius: FLAG_RADIUS,
            center: Vec3::new(0.0, FLAG_HEIGHT / 2.0, 0.0),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn state(&self) -> FlagState {
        self.state
    }

    pub fn carrier(&self) -> Option<PlayerId> {
        match self.state {
            FlagState::Carried(player) => Some(player),
            FlagState::Free => None,
        }
    }

    /// Try to hand the flag to `player`. Fails when someone else already
    /// holds the authority token this tick.
    pub fn try_attach(&mut self, world: &mut PhysicsWorld, player: PlayerId) -> bool {
        if self.state != FlagState::Free || !self.authority.try_claim(player) {
            return false;
        }
        self.state = FlagState::Carried(player);
        self.vertical_velocity = 0.0;
        if let Some(handle) = self.collider.take() {
            world.remove_collider(handle);
            world.update_query_pipeline();
        }
        debug!("{} flag taken by player {}", self.team, player);
        true
    }

    /// Drop above `position` (the carrier's last grounded spot) and let the
    /// fall simulation bring it down.
    pub fn drop_at(&mut self, world: &mut PhysicsWorld, position: Vec3, respawn_height: f32) {
        self.authority.release();
        self.state = FlagState::Free;
        self.position = position + Vec3::Y * respawn_height;
        self.vertical_velocity = 0.0;
        self.ensure_collider(world);
        debug!("{} flag dropped at {:?}", self.team, self.position);
    }

    /// Send the flag back to its base (returned or scored).
    pub fn respawn(&mut self, world: &mut PhysicsWorld) {
        self.authority.release();
        self.state = FlagState::Free;
        self.position = self.spawn;
        self.vertical_velocity = 0.0;
        self.ensure_collider(world);
        debug!("{} flag back at base", self.team);
    }

    /// Pin a carried flag to its carrier.
    pub fn follow(&mut self, carrier_position: Vec3) {
        if matches!(self.state, FlagState::Carried(_)) {
            self.position = carrier_position;
        }
    }

    /// Advance the drop simulation one tick. Free flags only.
    pub fn tick(&mut self, world: &mut PhysicsWorld, gravity: f32, dt: f32) {
        let Some(handle) = self.collider else {
            return;
        };
        let capsule = Self::capsule();
        {
            let caster = world.caster_excluding(handle);
            let grounded = caster
                .cast_capsule(&capsule, self.position, Vec3::NEG_Y, GROUND_CLEARANCE)
                .is_some();
            if grounded {
                self.vertical_velocity = 0.0;
            } else {
                self.vertical_velocity += gravity * dt;
                let drop = -self.vertical_velocity * dt;
                match caster.cast_capsule(&capsule, self.position, Vec3::NEG_Y, drop) {
                    Some(hit) => {
                        self.position.y -= hit.distance;
                        self.vertical_velocity = 0.0;
                    }
                    None => self.position.y -= drop,
                }
            }
        }
        world.sync_capsule(handle, &capsule, self.position);
    }

    fn ensure_collider(&mut self, world: &mut PhysicsWorld) {
        let capsule = Self::capsule();
        match self.collider {
            Some(handle) => world.sync_capsule(handle, &capsule, self.position),
            None => {
                self.collider =
                    Some(world.add_capsule(self.position, &capsule, level::flag_tag(self.team)));
                world.update_query_pipeline();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane(level::TERRAIN);
        world.update_query_pipeline();
        world
    }

    #[test]
    fn free_flag_falls_and_settles_on_ground() {
        let mut world = flat_world();
        let mut flag = Flag::new(&mut world, Team::Red, Vec3::ZERO, 5.0);
        assert_eq!(flag.position().y, 5.0);
        let dt = 0.02;
        for _ in 0..200 {
            flag.tick(&mut world, -25.0, dt);
        }
        // Settled at the ground and stays there.
        assert!(flag.position().y >= -0.01);
        assert!(flag.position().y <= GROUND_CLEARANCE + 0.01);
        let rest = flag.position().y;
        flag.tick(&mut world, -25.0, dt);
        assert_eq!(flag.position().y, rest);
    }

    #[test]
    fn attach_is_first_claim_wins() {
        let mut world = flat_world();
        let mut flag = Flag::new(&mut world, Team::Blue, Vec3::ZERO, 5.0);
        assert!(flag.try_attach(&mut world, 0));
        assert_eq!(flag.carrier(), Some(0));
        // Already carried; a second diver gets nothing.
        assert!(!flag.try_attach(&mut world, 1));
        assert_eq!(flag.carrier(), Some(0));
    }

    #[test]
    fn drop_releases_authority_for_the_next_carrier() {
        let mut world = flat_world();
        let mut flag = Flag::new(&mut world, Team::Blue, Vec3::ZERO, 5.0);
        assert!(flag.try_attach(&mut world, 0));
        flag.drop_at(&mut world, Vec3::new(3.0, 0.0, 1.0), 5.0);
        assert_eq!(flag.state(), FlagState::Free);
        assert_eq!(flag.position(), Vec3::new(3.0, 5.0, 1.0));
        assert!(flag.try_attach(&mut world, 1));
        assert_eq!(flag.carrier(), Some(1));
    }

    #[test]
    fn respawn_returns_to_base_height() {
        let mut world = flat_world();
        let base = Vec3::new(-18.0, 0.2, 0.0);
        let mut flag = Flag::new(&mut world, Team::Red, base, 5.0);
        assert!(flag.try_attach(&mut world, 0));
        flag.follow(Vec3::new(4.0, 1.5, 4.0));
        assert_eq!(flag.position(), Vec3::new(4.0, 1.5, 4.0));
        flag.respawn(&mut world);
        assert_eq!(flag.position(), base + Vec3::Y * 5.0);
        assert_eq!(flag.state(), FlagState::Free);
    }
}
