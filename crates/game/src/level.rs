//! Arena layout and the surface-tag conventions the match logic keys off.
//!
//! Tags 0-7 are terrain, 8-15 flags, 16 and up players. The mover reports
//! tags back on contacts and grounded checks; everything the CTF rules need
//! to know about "what did I touch" travels through them.

use crate::authority::PlayerId;
use crate::team::Team;
use glam::Vec3;
use locomotion::SurfaceTag;
use physics::PhysicsWorld;

pub const TERRAIN: SurfaceTag = SurfaceTag::UNTAGGED;
pub const RED_ZONE: SurfaceTag = SurfaceTag(1);
pub const BLUE_ZONE: SurfaceTag = SurfaceTag(2);

const FLAG_TAG_BASE: u32 = 8;
const PLAYER_TAG_BASE: u32 = 16;

pub fn zone_tag(team: Team) -> SurfaceTag {
    match team {
        Team::Red => RED_ZONE,
        Team::Blue => BLUE_ZONE,
    }
}

pub fn flag_tag(team: Team) -> SurfaceTag {
    SurfaceTag(FLAG_TAG_BASE + team.index() as u32)
}

pub fn flag_from_tag(tag: SurfaceTag) -> Option<Team> {
    match tag.0 {
        t if t == FLAG_TAG_BASE => Some(Team::Red),
        t if t == FLAG_TAG_BASE + 1 => Some(Team::Blue),
        _ => None,
    }
}

pub fn player_tag(player: PlayerId) -> SurfaceTag {
    SurfaceTag(PLAYER_TAG_BASE + player as u32)
}

pub fn player_from_tag(tag: SurfaceTag) -> Option<PlayerId> {
    if tag.0 >= PLAYER_TAG_BASE {
        Some((tag.0 - PLAYER_TAG_BASE) as PlayerId)
    } else {
        None
    }
}

/// The static world plus the handful of gameplay positions hung off it.
pub struct Level {
    pub world: PhysicsWorld,
    spawns: [Vec3; 2],
    spawn_yaws: [f32; 2],
    flag_bases: [Vec3; 2],
}

impl Level {
    /// Flat two-base arena: capture pads at either end, a few cover blocks
    /// in the middle, walls around the outside.
    pub fn arena() -> Self {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane(TERRAIN);

        // Capture pads. Standing on one is what triggers returns and scores.
        world.add_static_cuboid(
            Vec3::new(-18.0, 0.1, 0.0),
            0.0,
            Vec3::new(3.0, 0.1, 3.0),
            RED_ZONE,
        );
        world.add_static_cuboid(
            Vec3::new(18.0, 0.1, 0.0),
            0.0,
            Vec3::new(3.0, 0.1, 3.0),
            BLUE_ZONE,
        );

        // Mid-field cover.
        world.add_static_cuboid(
            Vec3::new(0.0, 1.0, 6.0),
            0.6,
            Vec3::new(2.0, 1.0, 0.5),
            TERRAIN,
        );
        world.add_static_cuboid(
            Vec3::new(0.0, 1.0, -6.0),
            -0.6,
            Vec3::new(2.0, 1.0, 0.5),
            TERRAIN,
        );
        world.add_static_cuboid(
            Vec3::new(0.0, 0.5, 0.0),
            0.0,
            Vec3::new(0.5, 0.5, 3.0),
            TERRAIN,
        );

        // Perimeter walls.
        for x in [-30.0_f32, 30.0] {
            world.add_static_cuboid(
                Vec3::new(x, 4.0, 0.0),
                0.0,
                Vec3::new(1.0, 4.0, 31.0),
                TERRAIN,
            );
        }
        for z in [-30.0_f32, 30.0] {
            world.add_static_cuboid(
                Vec3::new(0.0, 4.0, z),
                0.0,
                Vec3::new(31.0, 4.0, 1.0),
                TERRAIN,
            );
        }

        world.update_query_pipeline();

        Self {
            world,
            spawns: [Vec3::new(-24.0, 1.5, 0.0), Vec3::new(24.0, 1.5, 0.0)],
            // Yaw 0 faces -Z; each team spawns facing the enemy base.
            spawn_yaws: [-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2],
            flag_bases: [Vec3::new(-18.0, 0.2, 0.0), Vec3::new(18.0, 0.2, 0.0)],
        }
    }

    pub fn spawn(&self, team: Team) -> Vec3 {
        self.spawns[team.index()]
    }

    pub fn spawn_yaw(&self, team: Team) -> f32 {
        self.spawn_yaws[team.index()]
    }

    pub fn flag_base(&self, team: Team) -> Vec3 {
        self.flag_bases[team.index()]
    }
}
