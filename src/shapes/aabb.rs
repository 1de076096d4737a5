//! Axis-aligned bounding box: both a standalone `Box` primitive (§4.1) and
//! the bounding volume octree nodes carry for their early-out test (§4.2).

use crate::core::hit::HitPoint;
use crate::core::material::Material;
use crate::core::matrix::Matrix4;
use crate::core::numeric::{Float, EPSILON};
use crate::core::ray::Ray;
use crate::core::vector::Vec3;
use crate::shapes::Transform;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Aabb {
        Aabb { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Aabb> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Aabb::new(first, first);
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn union(self, other: Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Slab-method ray/box test. Returns `(t, outward normal)` of the
    /// nearest entering intersection, or `None` on a miss — including when
    /// the box is entirely behind the ray origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(Float, Vec3)> {
        let mut t_min = std::f32::NEG_INFINITY;
        let mut t_max = std::f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() < 1e-12 {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv_dir = 1.0 / dir;
            let mut t0 = (lo - origin) * inv_dir;
            let mut t1 = (hi - origin) * inv_dir;
            let mut axis_normal_sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                axis_normal_sign = 1.0;
            }
            if t0 > t_min {
                t_min = t0;
                normal = Vec3::ZERO;
                normal = match axis {
                    0 => Vec3::new(axis_normal_sign, 0.0, 0.0),
                    1 => Vec3::new(0.0, axis_normal_sign, 0.0),
                    _ => Vec3::new(0.0, 0.0, axis_normal_sign),
                };
            }
            if t1 < t_max {
                t_max = t1;
            }
            if t_min > t_max {
                return None;
            }
        }
        if t_max < EPSILON {
            return None;
        }
        let t = if t_min > EPSILON { t_min } else { t_max };
        Some((t, normal))
    }
}

/// Axis-aligned box primitive (the SDF `box` directive, §6.1): a local AABB
/// carried through the same `Transform` every other shape uses, rather than
/// an untransformable raw bounds pair.
#[derive(Debug, Clone)]
pub struct BoxShape {
    pub name: String,
    pub material: Option<Arc<Material>>,
    pub transform: Transform,
    pub bounds: Aabb,
}

impl BoxShape {
    pub fn new(name: impl Into<String>, min: Vec3, max: Vec3, material: Option<Arc<Material>>) -> BoxShape {
        BoxShape {
            name: name.into(),
            material,
            transform: Transform::identity(),
            bounds: Aabb::new(min, max),
        }
    }

    pub fn area(&self) -> Float {
        let d = self.bounds.max - self.bounds.min;
        2.0 * (d.x * d.y + d.y * d.z + d.x * d.z)
    }

    pub fn volume(&self) -> Float {
        let d = self.bounds.max - self.bounds.min;
        d.x * d.y * d.z
    }

    pub fn world_bounds(&self, outer: &Matrix4) -> Aabb {
        let combined = outer.mul(&self.transform.world);
        let min = self.bounds.min;
        let max = self.bounds.max;
        let corners = (0..8u8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        });
        Aabb::from_points(corners.map(|p| combined.transform_point(p)))
            .expect("a box always contributes eight corners")
    }

    pub fn intersect(&self, ray: &Ray) -> HitPoint {
        let local = self.transform.ray_to_local(ray);
        let (t, local_normal) = match self.bounds.intersect_ray(&local) {
            Some(hit) => hit,
            None => return HitPoint::none(),
        };
        let local_pos = local.origin + local.direction * t;
        let world_pos = self.transform.point_to_world(local_pos);
        let world_normal = self.transform.dir_to_world(local_normal);

        HitPoint {
            did_hit: true,
            t,
            shape_name: self.name.clone(),
            material: self.material.clone(),
            position: world_pos,
            incoming: ray.direction,
            normal: world_normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_center_hits_near_face() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = bounds.intersect_ray(&ray);
        assert!(hit.is_some());
        let (t, normal) = hit.unwrap();
        assert!((t - 4.0).abs() < 1e-3);
        assert_eq!(normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn ray_missing_box_returns_none() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(bounds.intersect_ray(&ray).is_none());
    }

    #[test]
    fn box_shape_hit_normal_points_outward() {
        let b = BoxShape::new("b", Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), None);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = b.intersect(&ray);
        assert!(hit.did_hit);
        assert!((hit.normal - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn box_shape_translated_moves_hit_point() {
        let mut b = BoxShape::new("b", Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0), None);
        b.transform.translate(5.0, 0.0, 0.0);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = b.intersect(&ray);
        assert!(hit.did_hit);
        assert!((hit.position.x - 5.0).abs() < 1e-3);
    }
}
