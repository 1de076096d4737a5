//! `HitPoint`: the result of intersecting a ray against a shape. Its
//! `Default` has `did_hit = false`; every other field is meaningless until
//! a caller checks `did_hit`.

use crate::core::material::Material;
use crate::core::numeric::Float;
use crate::core::vector::Vec3;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HitPoint {
    pub did_hit: bool,
    pub t: Float,
    pub shape_name: String,
    pub material: Option<Arc<Material>>,
    pub position: Vec3,
    pub incoming: Vec3,
    pub normal: Vec3,
}

impl Default for HitPoint {
    fn default() -> HitPoint {
        HitPoint {
            did_hit: false,
            t: 0.0,
            shape_name: String::new(),
            material: None,
            position: Vec3::ZERO,
            incoming: Vec3::ZERO,
            normal: Vec3::ZERO,
        }
    }
}

impl HitPoint {
    pub fn none() -> HitPoint {
        HitPoint::default()
    }
}
