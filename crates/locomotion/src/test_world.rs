//! Analytic half-space world for tests. Capsule casts against planes have
//! closed-form times of impact, so expected positions can be worked out by
//! hand.

use glam::Vec3;

use crate::world::{Capsule, ShapeCastHit, ShapeCaster, SurfaceTag};

struct Plane {
    normal: Vec3,
    /// Signed distance of the plane from the origin along `normal`.
    offset: f32,
    tag: SurfaceTag,
}

impl Plane {
    fn clearance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

pub struct PlaneWorld {
    planes: Vec<Plane>,
}

impl PlaneWorld {
    /// A single horizontal floor at height `y`.
    pub fn floor(y: f32) -> Self {
        Self {
            planes: vec![Plane {
                normal: Vec3::Y,
                offset: y,
                tag: SurfaceTag::UNTAGGED,
            }],
        }
    }

    /// A single wall facing -x at `x`.
    pub fn wall_x(x: f32) -> Self {
        Self {
            planes: vec![Plane {
                normal: Vec3::NEG_X,
                offset: -x,
                tag: SurfaceTag::UNTAGGED,
            }],
        }
    }

    pub fn with_wall_x(mut self, x: f32) -> Self {
        self.planes.push(Plane {
            normal: Vec3::NEG_X,
            offset: -x,
            tag: SurfaceTag::UNTAGGED,
        });
        self
    }

    pub fn with_floor_tag(mut self, tag: SurfaceTag) -> Self {
        for plane in &mut self.planes {
            if plane.normal == Vec3::Y {
                plane.tag = tag;
            }
        }
        self
    }

    fn cast_points(
        &self,
        points: &[Vec3],
        radius: f32,
        direction: Vec3,
        distance: f32,
    ) -> Option<ShapeCastHit> {
        let mut best: Option<ShapeCastHit> = None;
        for plane in &self.planes {
            let rate = -plane.normal.dot(direction);
            if rate <= 0.0 {
                continue;
            }
            let (deepest, clearance) = points
                .iter()
                .map(|&p| (p, plane.clearance(p) - radius))
                .min_by(|a, b| a.1.total_cmp(&b.1))?;
            let toi = (clearance / rate).max(0.0);
            if clearance / rate > distance {
                continue;
            }
            let point = deepest + direction * toi - plane.normal * radius;
            let closer = best.as_ref().map_or(true, |b| toi < b.distance);
            if closer {
                best = Some(ShapeCastHit {
                    point,
                    normal: plane.normal,
                    distance: toi,
                    surface: plane.tag,
                });
            }
        }
        best
    }
}

impl ShapeCaster for PlaneWorld {
    fn cast_capsule(
        &self,
        capsule: &Capsule,
        position: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Option<ShapeCastHit> {
        let (bottom, top) = capsule.segment(position);
        self.cast_points(&[bottom, top], capsule.radius, direction, distance)
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, distance: f32) -> Option<ShapeCastHit> {
        self.cast_points(&[origin], 0.0, direction, distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_floor_at_exact_distance() {
        let world = PlaneWorld::floor(0.0);
        let hit = world
            .cast_ray(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 5.0)
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn ray_moving_away_misses() {
        let world = PlaneWorld::floor(0.0);
        assert!(world.cast_ray(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, 5.0).is_none());
    }
}
