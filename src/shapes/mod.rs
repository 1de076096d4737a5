//! Geometric primitives and the octree-accelerated composite shape.
//!
//! A `Shape` is modeled as a tagged union rather than a trait-object
//! hierarchy (Design Notes, §9): every variant shares one small
//! [`Transform`] helper for the `world_transform`/`world_transform_inv`
//! bookkeeping instead of duplicating it (or expressing it through virtual
//! inheritance, as the original tool does).

pub mod aabb;
pub mod composite;
pub mod sphere;
pub mod triangle;

use crate::core::hit::HitPoint;
use crate::core::matrix::Matrix4;
use crate::core::material::Material;
use crate::core::ray::Ray;
use crate::core::vector::Vec3;
use std::sync::Arc;

pub use aabb::{Aabb, BoxShape};
pub use composite::Composite;
pub use sphere::Sphere;
pub use triangle::Triangle;

/// `world_transform` / `world_transform_inv` bookkeeping shared by every
/// shape variant. `scale`/`rotate`/`translate` right-multiply the existing
/// transform by the elementary matrix (matching the original tool's
/// `glm::scale`/`glm::rotate`/`glm::translate` semantics); `set` replaces it
/// outright (the `transform` directive).
#[derive(Debug, Clone)]
pub struct Transform {
    pub world: Matrix4,
    pub world_inv: Matrix4,
}

impl Transform {
    pub fn identity() -> Transform {
        Transform {
            world: Matrix4::identity(),
            world_inv: Matrix4::identity(),
        }
    }

    pub fn set(&mut self, m: Matrix4) {
        self.world = m;
        self.world_inv = m.inverse();
    }

    pub fn scale(&mut self, sx: Float, sy: Float, sz: Float) {
        self.set(self.world.mul(&Matrix4::scaling(sx, sy, sz)));
    }

    pub fn rotate(&mut self, yaw: Float, pitch: Float, roll: Float) {
        self.set(self.world.mul(&Matrix4::euler_yxz(yaw, pitch, roll)));
    }

    pub fn translate(&mut self, x: Float, y: Float, z: Float) {
        self.set(self.world.mul(&Matrix4::translation(x, y, z)));
    }

    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.world_inv.transform_point(ray.origin),
            self.world_inv.transform_dir(ray.direction),
        )
    }

    pub fn point_to_world(&self, p: Vec3) -> Vec3 {
        self.world.transform_point(p)
    }

    pub fn dir_to_world(&self, v: Vec3) -> Vec3 {
        self.world.transform_dir(v).normalized()
    }
}

use crate::core::numeric::Float;

#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
    Box(aabb::BoxShape),
    Composite(Composite),
}

impl Shape {
    pub fn name(&self) -> &str {
        match self {
            Shape::Sphere(s) => &s.name,
            Shape::Triangle(t) => &t.name,
            Shape::Box(b) => &b.name,
            Shape::Composite(c) => &c.name,
        }
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        match self {
            Shape::Sphere(s) => s.material.as_ref(),
            Shape::Triangle(t) => t.material.as_ref(),
            Shape::Box(b) => b.material.as_ref(),
            Shape::Composite(c) => c.material.as_ref(),
        }
    }

    pub fn area(&self) -> Float {
        match self {
            Shape::Sphere(s) => s.area(),
            Shape::Triangle(t) => t.area(),
            Shape::Box(b) => b.area(),
            Shape::Composite(c) => c.area(),
        }
    }

    pub fn volume(&self) -> Float {
        match self {
            Shape::Sphere(s) => s.volume(),
            Shape::Triangle(t) => t.volume(),
            Shape::Box(b) => b.volume(),
            Shape::Composite(c) => c.volume(),
        }
    }

    /// World-space AABB of this shape under an additional outer transform
    /// (used by the octree builder to re-derive bounds of nested
    /// composites).
    pub fn world_bounds(&self, outer: &Matrix4) -> Aabb {
        match self {
            Shape::Sphere(s) => s.world_bounds(outer),
            Shape::Triangle(t) => t.world_bounds(outer),
            Shape::Box(b) => b.world_bounds(outer),
            Shape::Composite(c) => c.world_bounds(outer),
        }
    }

    pub fn intersect(&self, ray: &Ray) -> HitPoint {
        match self {
            Shape::Sphere(s) => s.intersect(ray),
            Shape::Triangle(t) => t.intersect(ray),
            Shape::Box(b) => b.intersect(ray),
            Shape::Composite(c) => c.intersect(ray),
        }
    }

    pub fn scale(&mut self, sx: Float, sy: Float, sz: Float) {
        match self {
            Shape::Sphere(s) => s.transform.scale(sx, sy, sz),
            Shape::Triangle(t) => t.transform.scale(sx, sy, sz),
            Shape::Box(b) => b.transform.scale(sx, sy, sz),
            Shape::Composite(c) => c.scale(sx, sy, sz),
        }
    }

    pub fn rotate(&mut self, yaw: Float, pitch: Float, roll: Float) {
        match self {
            Shape::Sphere(s) => s.transform.rotate(yaw, pitch, roll),
            Shape::Triangle(t) => t.transform.rotate(yaw, pitch, roll),
            Shape::Box(b) => b.transform.rotate(yaw, pitch, roll),
            Shape::Composite(c) => c.rotate(yaw, pitch, roll),
        }
    }

    pub fn translate(&mut self, x: Float, y: Float, z: Float) {
        match self {
            Shape::Sphere(s) => s.transform.translate(x, y, z),
            Shape::Triangle(t) => t.transform.translate(x, y, z),
            Shape::Box(b) => b.transform.translate(x, y, z),
            Shape::Composite(c) => c.translate(x, y, z),
        }
    }

    pub fn set_transform(&mut self, m: Matrix4) {
        match self {
            Shape::Sphere(s) => s.transform.set(m),
            Shape::Triangle(t) => t.transform.set(m),
            Shape::Box(b) => b.transform.set(m),
            Shape::Composite(c) => c.set_transform(m),
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Shape::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut Composite> {
        match self {
            Shape::Composite(c) => Some(c),
            _ => None,
        }
    }
}
