//! Physics world management with Rapier3D.
//!
//! The level world is query-only from the locomotion core's point of view:
//! characters are swept capsules, not simulated bodies, so the world mostly
//! answers shape casts. Player capsules still live here as colliders so that
//! players block each other and show up in each other's sweeps.

use glam::Vec3;
use locomotion::{Capsule as CharacterCapsule, ShapeCaster, SurfaceTag};
use rapier3d::na::{Isometry3, Vector3};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

use crate::collision::CollisionGroup;

fn env_collision_groups() -> InteractionGroups {
    let (membership, filter) = CollisionGroup::environment();
    InteractionGroups::new(membership, filter)
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update the query pipeline after colliders moved without a step.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a flat ground half-space at y = 0 carrying `tag`.
    pub fn add_ground_plane(&mut self, tag: SurfaceTag) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(env_collision_groups())
            .user_data(tag.0 as u128)
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a static cuboid collider (walls, platforms, capture zone floors).
    /// `rotation_y_rad` rotates the box around the world Y axis.
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
        tag: SurfaceTag,
    ) -> ColliderHandle {
        let tra = vector![translation.x, translation.y, translation.z];
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(tra, axisangle);
        let collider = ColliderBuilder::cuboid(
            half_extents.x as Real,
            half_extents.y as Real,
            half_extents.z as Real,
        )
        .position(position)
        .collision_groups(env_collision_groups())
        .user_data(tag.0 as u128)
        .build();
        self.collider_set.insert(collider)
    }

    /// Add a tagged gameplay capsule (player bodies, flag poles). The
    /// capsule is a free collider, repositioned every tick by `sync_capsule`.
    pub fn add_capsule(
        &mut self,
        position: Vec3,
        capsule: &CharacterCapsule,
        tag: SurfaceTag,
    ) -> ColliderHandle {
        let (membership, filter) = CollisionGroup::player();
        let center = position + capsule.center;
        let half = (capsule.height / 2.0 - capsule.radius).max(0.0);
        let collider = ColliderBuilder::capsule_y(half, capsule.radius)
            .translation(vector![center.x, center.y, center.z])
            .collision_groups(InteractionGroups::new(membership, filter))
            .user_data(tag.0 as u128)
            .build();
        self.collider_set.insert(collider)
    }

    /// Move a player's capsule collider to match its ticked state.
    pub fn sync_capsule(
        &mut self,
        handle: ColliderHandle,
        capsule: &CharacterCapsule,
        position: Vec3,
    ) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            let center = position + capsule.center;
            collider.set_translation(vector![center.x, center.y, center.z]);
            let half = (capsule.height / 2.0 - capsule.radius).max(0.0);
            collider.set_shape(SharedShape::capsule_y(half, capsule.radius));
        }
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    fn surface_tag(&self, collider: ColliderHandle) -> SurfaceTag {
        self.collider_set
            .get(collider)
            .map_or(SurfaceTag::UNTAGGED, |c| SurfaceTag(c.user_data as u32))
    }

    /// A caster over the whole world.
    pub fn caster(&self) -> WorldCaster<'_> {
        WorldCaster {
            world: self,
            exclude: None,
        }
    }

    /// A caster that ignores one collider, so a player's own capsule never
    /// blocks its sweeps.
    pub fn caster_excluding(&self, collider: ColliderHandle) -> WorldCaster<'_> {
        WorldCaster {
            world: self,
            exclude: Some(collider),
        }
    }
}

/// Borrowed view of the world that answers the locomotion core's sweeps.
pub struct WorldCaster<'a> {
    world: &'a PhysicsWorld,
    exclude: Option<ColliderHandle>,
}

impl WorldCaster<'_> {
    fn filter(&self) -> QueryFilter<'_> {
        let mut filter = QueryFilter::default();
        if let Some(handle) = self.exclude {
            filter = filter.exclude_collider(handle);
        }
        filter
    }

    /// Surface normals always face back against the cast.
    fn facing_normal(direction: Vec3, normal: Vec3) -> Vec3 {
        if normal.dot(direction) > 0.0 {
            -normal
        } else {
            normal
        }
    }
}

impl ShapeCaster for WorldCaster<'_> {
    fn cast_capsule(
        &self,
        capsule: &CharacterCapsule,
        position: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Option<locomotion::ShapeCastHit> {
        let center = position + capsule.center;
        let half = (capsule.height / 2.0 - capsule.radius).max(0.0);
        let shape = Capsule::new_y(half, capsule.radius);
        let shape_pos = Isometry::translation(center.x, center.y, center.z);
        let shape_vel = vector![direction.x, direction.y, direction.z];

        self.world
            .query_pipeline
            .cast_shape(
                &self.world.rigid_body_set,
                &self.world.collider_set,
                &shape_pos,
                &shape_vel,
                &shape,
                ShapeCastOptions::with_max_time_of_impact(distance),
                self.filter(),
            )
            .map(|(collider, hit)| {
                let normal = Vec3::new(hit.normal2.x, hit.normal2.y, hit.normal2.z);
                locomotion::ShapeCastHit {
                    point: Vec3::new(hit.witness2.x, hit.witness2.y, hit.witness2.z),
                    normal: Self::facing_normal(direction, normal),
                    distance: hit.time_of_impact,
                    surface: self.world.surface_tag(collider),
                }
            })
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Option<locomotion::ShapeCastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.world
            .query_pipeline
            .cast_ray_and_get_normal(
                &self.world.rigid_body_set,
                &self.world.collider_set,
                &ray,
                distance,
                true,
                self.filter(),
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                let normal = Vec3::new(
                    intersection.normal.x,
                    intersection.normal.y,
                    intersection.normal.z,
                );
                locomotion::ShapeCastHit {
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Self::facing_normal(direction, normal),
                    distance: intersection.time_of_impact,
                    surface: self.world.surface_tag(collider),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing_capsule() -> CharacterCapsule {
        CharacterCapsule {
            height: 2.0,
            radius: 0.5,
            center: Vec3::new(0.0, -0.5, 0.0),
        }
    }

    #[test]
    fn ray_hits_tagged_ground() {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane(SurfaceTag(3));
        world.update_query_pipeline();

        let hit = world
            .caster()
            .cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 5.0)
            .expect("ground below");
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert_eq!(hit.surface, SurfaceTag(3));
        assert!(hit.normal.y > 0.9);
    }

    #[test]
    fn capsule_cast_reports_clearance_to_ground() {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane(SurfaceTag::UNTAGGED);
        world.update_query_pipeline();

        // capsule bottom 1.0 above the plane
        let capsule = standing_capsule();
        let hit = world
            .caster()
            .cast_capsule(&capsule, Vec3::new(0.0, 2.5, 0.0), Vec3::NEG_Y, 5.0)
            .expect("ground below");
        assert!((hit.distance - 1.0).abs() < 1e-3);
        assert!(hit.normal.y > 0.9);
    }

    #[test]
    fn excluded_collider_is_invisible() {
        let mut world = PhysicsWorld::new();
        let capsule = standing_capsule();
        let own = world.add_capsule(Vec3::new(0.0, 1.5, 0.0), &capsule, SurfaceTag(9));
        world.update_query_pipeline();

        // a sweep from inside the capsule sees it unless excluded
        let origin = Vec3::new(0.0, 5.0, 0.0);
        assert!(world.caster().cast_ray(origin, Vec3::NEG_Y, 10.0).is_some());
        assert!(world
            .caster_excluding(own)
            .cast_ray(origin, Vec3::NEG_Y, 10.0)
            .is_none());
    }

    #[test]
    fn players_see_each_other() {
        let mut world = PhysicsWorld::new();
        let capsule = standing_capsule();
        let a = world.add_capsule(Vec3::new(0.0, 1.5, 0.0), &capsule, SurfaceTag(10));
        world.add_capsule(Vec3::new(3.0, 1.5, 0.0), &capsule, SurfaceTag(11));
        world.update_query_pipeline();

        let hit = world
            .caster_excluding(a)
            .cast_capsule(&capsule, Vec3::new(0.0, 1.5, 0.0), Vec3::X, 5.0)
            .expect("other player in the way");
        assert_eq!(hit.surface, SurfaceTag(11));
        // surfaces are 2 radii apart over a 3 m gap
        assert!((hit.distance - 2.0).abs() < 1e-3);
    }
}
