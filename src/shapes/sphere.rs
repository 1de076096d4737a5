//! Analytic sphere primitive.

use crate::core::hit::HitPoint;
use crate::core::material::Material;
use crate::core::numeric::{Float, EPSILON, PI};
use crate::core::ray::Ray;
use crate::core::vector::Vec3;
use crate::shapes::{Aabb, Transform};
use crate::core::matrix::Matrix4;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Sphere {
    pub name: String,
    pub material: Option<Arc<Material>>,
    pub transform: Transform,
    pub radius: Float,
    pub center: Vec3,
}

impl Sphere {
    pub fn new(name: impl Into<String>, center: Vec3, radius: Float, material: Option<Arc<Material>>) -> Sphere {
        Sphere {
            name: name.into(),
            material,
            transform: Transform::identity(),
            radius: radius.abs(),
            center,
        }
    }

    pub fn area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }

    pub fn volume(&self) -> Float {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }

    pub fn world_bounds(&self, outer: &Matrix4) -> Aabb {
        let combined = outer.mul(&self.transform.world);
        // A sphere's bounding box under a general affine transform is the
        // AABB of its transformed "extreme" points along each local axis,
        // which is exactly the AABB of the 8 corners of its local AABB.
        let r = Vec3::splat(self.radius);
        let local_min = self.center - r;
        let local_max = self.center + r;
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { local_min.x } else { local_max.x },
                if i & 2 == 0 { local_min.y } else { local_max.y },
                if i & 4 == 0 { local_min.z } else { local_max.z },
            )
        });
        Aabb::from_points(corners.map(|p| combined.transform_point(p)))
            .unwrap_or_else(|| Aabb::new(combined.transform_point(self.center), combined.transform_point(self.center)))
    }

    pub fn intersect(&self, ray: &Ray) -> HitPoint {
        #[cfg(test)]
        intersect_calls::record();
        let local = self.transform.ray_to_local(ray);
        let dir = local.direction.normalized();
        let oc = local.origin - self.center;

        let b = oc.dot(dir);
        let c = oc.dot(oc) - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return HitPoint::none();
        }
        let sqrt_d = discriminant.sqrt();
        let t0 = -b - sqrt_d;
        let t1 = -b + sqrt_d;
        let t_raw = if t0 > EPSILON {
            t0
        } else if t1 > EPSILON {
            t1
        } else {
            return HitPoint::none();
        };
        let t = t_raw - EPSILON;
        let local_pos = local.origin + dir * t;
        let world_pos = self.transform.point_to_world(local_pos);
        let world_center = self.transform.point_to_world(self.center);
        let normal = (world_pos - world_center).normalized();

        HitPoint {
            did_hit: true,
            t,
            shape_name: self.name.clone(),
            material: self.material.clone(),
            position: world_pos,
            incoming: ray.direction,
            normal,
        }
    }
}

/// Test-only call counter used to measure how many leaf sphere
/// intersections an octree traversal actually performs, vs. the flat
/// per-primitive count (§8 scenario 4: octree stress).
#[cfg(test)]
pub(crate) mod intersect_calls {
    use std::cell::Cell;

    thread_local! {
        static COUNT: Cell<usize> = Cell::new(0);
    }

    pub(crate) fn record() {
        COUNT.with(|c| c.set(c.get() + 1));
    }

    pub(crate) fn reset() {
        COUNT.with(|c| c.set(0));
    }

    pub(crate) fn get() -> usize {
        COUNT.with(|c| c.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_center_hits_near_surface() {
        let sphere = Sphere::new("s", Vec3::ZERO, 1.0, None);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&ray);
        assert!(hit.did_hit);
        assert!((hit.position.z - 1.0).abs() < 1e-2);
        assert!((hit.normal - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-2);
    }

    #[test]
    fn ray_missing_sphere_is_a_miss() {
        let sphere = Sphere::new("s", Vec3::ZERO, 1.0, None);
        let ray = Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!sphere.intersect(&ray).did_hit);
    }

    #[test]
    fn translated_sphere_matches_shifted_ray_baseline() {
        let mut sphere = Sphere::new("s", Vec3::ZERO, 1.0, None);
        sphere.transform.translate(2.0, 0.0, 0.0);
        let ray = Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let baseline = Sphere::new("s", Vec3::ZERO, 1.0, None);
        let baseline_ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.intersect(&ray);
        let baseline_hit = baseline.intersect(&baseline_ray);
        assert!(hit.did_hit && baseline_hit.did_hit);
        assert!((hit.t - baseline_hit.t).abs() < 1e-4);
    }
}
