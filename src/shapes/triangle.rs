//! Flat triangle primitive: Möller-Trumbore intersection in local space.

use crate::core::hit::HitPoint;
use crate::core::material::Material;
use crate::core::matrix::Matrix4;
use crate::core::numeric::{Float, EPSILON};
use crate::core::ray::Ray;
use crate::core::vector::Vec3;
use crate::shapes::{Aabb, Transform};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Triangle {
    pub name: String,
    pub material: Option<Arc<Material>>,
    pub transform: Transform,
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub normal: Vec3,
}

impl Triangle {
    /// Derives the face normal from vertex winding.
    pub fn new(name: impl Into<String>, v0: Vec3, v1: Vec3, v2: Vec3, material: Option<Arc<Material>>) -> Triangle {
        let normal = (v1 - v0).cross(v2 - v0).normalized();
        Triangle::with_normal(name, v0, v1, v2, normal, material)
    }

    /// Used for OBJ faces that carry their own `vn` normals.
    pub fn with_normal(
        name: impl Into<String>,
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        normal: Vec3,
        material: Option<Arc<Material>>,
    ) -> Triangle {
        Triangle {
            name: name.into(),
            material,
            transform: Transform::identity(),
            v0,
            v1,
            v2,
            normal,
        }
    }

    pub fn area(&self) -> Float {
        (self.v1 - self.v0).cross(self.v2 - self.v0).length() / 2.0
    }

    pub fn volume(&self) -> Float {
        0.0
    }

    pub fn world_bounds(&self, outer: &Matrix4) -> Aabb {
        let combined = outer.mul(&self.transform.world);
        Aabb::from_points([
            combined.transform_point(self.v0),
            combined.transform_point(self.v1),
            combined.transform_point(self.v2),
        ])
        .expect("a triangle always contributes three vertices")
    }

    pub fn intersect(&self, ray: &Ray) -> HitPoint {
        let local = self.transform.ray_to_local(ray);
        let v0v1 = self.v1 - self.v0;
        let v0v2 = self.v2 - self.v0;
        let p_vec = local.direction.cross(v0v2);
        let det = v0v1.dot(p_vec);

        if det.abs() < EPSILON {
            return HitPoint::none();
        }
        let inv_det = 1.0 / det;
        let t_vec = local.origin - self.v0;
        let u = t_vec.dot(p_vec) * inv_det;
        if u < 0.0 || u > 1.0 {
            return HitPoint::none();
        }
        let q_vec = t_vec.cross(v0v1);
        let v = local.direction.dot(q_vec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return HitPoint::none();
        }
        let t_raw = v0v2.dot(q_vec) * inv_det;
        if t_raw < EPSILON {
            return HitPoint::none();
        }
        let t = t_raw - EPSILON;
        let local_pos = local.origin + local.direction * t;
        let world_pos = self.transform.point_to_world(local_pos);
        let world_normal = self.transform.dir_to_world(self.normal);

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
