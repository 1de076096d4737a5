//! The `Ray` value type threaded through every intersection and shading
//! call.

use crate::core::vector::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Ray { origin, direction }
    }

    /// The point at parametric distance `t` along the ray.
    pub fn point_at(&self, t: crate::core::numeric::Float) -> Vec3 {
        self.origin + self.direction * t
    }
}
