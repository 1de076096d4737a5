//! Octree-accelerated group of named shapes (§4.2).
//!
//! A `Composite` is a spatial container: it owns its children by name (a
//! sorted map, so iteration order is deterministic and `find_child` is a
//! direct lookup) and caches an axis-aligned bound over them. Once a
//! composite holds more than [`LEAF_CAPACITY`] children, [`build_octree`]
//! recursively splits it into up to eight child composites, one per octant of
//! its bounds, and re-parents each original child into whichever octants its
//! own bounds touch (a child straddling a boundary can land in more than
//! one). If a single octant would end up holding every child — the group
//! is degenerate, e.g. all children coincident or collinear along the split
//! axis — the split buys nothing, so it's abandoned and the composite stays
//! a flat leaf.

use crate::core::hit::HitPoint;
use crate::core::material::Material;
use crate::core::matrix::Matrix4;
use crate::core::numeric::Float;
use crate::core::ray::Ray;
use crate::core::vector::Vec3;
use crate::shapes::{Aabb, Shape, Transform};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const LEAF_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct Composite {
    pub name: String,
    pub material: Option<Arc<Material>>,
    pub transform: Transform,
    bounds: Option<Aabb>,
    children: BTreeMap<String, Shape>,
}

impl Composite {
    pub fn new(name: impl Into<String>, material: Option<Arc<Material>>) -> Composite {
        Composite {
            name: name.into(),
            material,
            transform: Transform::identity(),
            bounds: None,
            children: BTreeMap::new(),
        }
    }

    fn with_bounds(name: impl Into<String>, bounds: Aabb) -> Composite {
        Composite {
            name: name.into(),
            material: None,
            transform: Transform::identity(),
            bounds: Some(bounds),
            children: BTreeMap::new(),
        }
    }

    pub fn add_child(&mut self, shape: Shape) {
        if self.children.contains_key(shape.name()) {
            log::warn!("composite {}: child name {} already present, overwriting", self.name, shape.name());
        }
        self.children.insert(shape.name().to_string(), shape);
    }

    pub fn find_child(&self, name: &str) -> Option<&Shape> {
        self.children.get(name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Shape> {
        self.children.get_mut(name)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn area(&self) -> Float {
        self.children.values().map(Shape::area).sum()
    }

    pub fn volume(&self) -> Float {
        self.children.values().map(Shape::volume).sum()
    }

    /// Bounds over every child in the composite's own local space (identity
    /// outer transform), i.e. *before* this composite's own transform is
    /// applied. This is what gets cached by [`build_octree`] and what
    /// [`world_bounds`] re-projects through the live transform on every call.
    fn local_bounds(&self) -> Aabb {
        let identity = Matrix4::identity();
        self.children
            .values()
            .map(|c| c.world_bounds(&identity))
            .fold(None, |acc: Option<Aabb>, b| Some(match acc {
                Some(a) => a.union(b),
                None => b,
            }))
            .unwrap_or_else(|| Aabb::new(Vec3::ZERO, Vec3::ZERO))
    }

    pub fn world_bounds(&self, outer: &Matrix4) -> Aabb {
        let local = self.bounds.unwrap_or_else(|| self.local_bounds());
        let combined = outer.mul(&self.transform.world);
        let min = local.min;
        let max = local.max;
        let corners = (0..8u8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        });
        Aabb::from_points(corners.map(|p| combined.transform_point(p))).unwrap_or(local)
    }

    /// Transforms the ray into local space once, tests it against the cached
    /// bound (an early-out, since a box test is far cheaper than walking
    /// every child), then — on a hit — walks children directly. The octree
    /// structure itself is just nested `Composite`s, so recursion into a
    /// child octant happens through the ordinary [`Shape::intersect`] path.
    pub fn intersect(&self, ray: &Ray) -> HitPoint {
        let local_ray = self.transform.ray_to_local(ray);

        if let Some(bounds) = self.bounds {
            if bounds.intersect_ray(&local_ray).is_none() {
                return HitPoint::none();
            }
        }

        let mut closest = HitPoint::none();
        for child in self.children.values() {
            let hit = child.intersect(&local_ray);
            if hit.did_hit && (!closest.did_hit || hit.t < closest.t) {
                closest = hit;
            }
        }
        if closest.did_hit {
            closest.position = self.transform.point_to_world(closest.position);
            closest.normal = self.transform.dir_to_world(closest.normal);
        }
        closest
    }

    /// Rebuilds the cached bound and, if there are more than
    /// [`LEAF_CAPACITY`] children, the octree of sub-composites. Must be
    /// re-run after any transform change (`scale`/`rotate`/`translate`/
    /// `set_transform`), since the split is keyed off the children's
    /// (transform-dependent) local bounds.
    pub fn build_octree(&mut self) {
        let bounds = self.local_bounds();
        self.bounds = Some(bounds);

        if self.children.len() <= LEAF_CAPACITY {
            return;
        }

        let oct_size = (bounds.max - bounds.min) * 0.5;
        let mut octants: Vec<Composite> = Vec::with_capacity(8);
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    let oct_min = bounds.min + Vec3::new(x as Float * oct_size.x, y as Float * oct_size.y, z as Float * oct_size.z);
                    let oct_max = bounds.min
                        + Vec3::new(
                            (x + 1) as Float * oct_size.x,
                            (y + 1) as Float * oct_size.y,
                            (z + 1) as Float * oct_size.z,
                        );
                    let index = z + 2 * y + 4 * x;
                    octants.push(Composite::with_bounds(index.to_string(), Aabb::new(oct_min, oct_max)));
                }
            }
        }

        let identity = Matrix4::identity();
        for octant in &mut octants {
            let octant_bounds = octant.bounds.expect("octant always has seed bounds");
            for child in self.children.values() {
                if octant_bounds.intersects(&child.world_bounds(&identity)) {
                    octant.add_child(child.clone());
                }
            }
        }

        // Degenerate split: one octant swallowed every child, so splitting
        // did not separate anything.
        if octants.iter().any(|o| o.child_count() == self.children.len()) {
            return;
        }

        self.children.clear();
        for mut octant in octants {
            if octant.child_count() > 0 {
                octant.build_octree();
                self.add_child(Shape::Composite(octant));
            }
        }
    }

    pub fn scale(&mut self, sx: Float, sy: Float, sz: Float) {
        self.transform.scale(sx, sy, sz);
        self.build_octree();
    }

    pub fn rotate(&mut self, yaw: Float, pitch: Float, roll: Float) {
        self.transform.rotate(yaw, pitch, roll);
        self.build_octree();
    }

    pub fn translate(&mut self, x: Float, y: Float, z: Float) {
        self.transform.translate(x, y, z);
        self.build_octree();
    }

    pub fn set_transform(&mut self, m: Matrix4) {
        self.transform.set(m);
        self.build_octree();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Sphere;

    fn sphere_at(name: &str, x: Float) -> Shape {
        Shape::Sphere(Sphere::new(name, Vec3::new(x, 0.0, 0.0), 0.2, None))
    }

    #[test]
    fn empty_composite_has_zero_bounds_and_no_hit() {
        let mut group = Composite::new("g", None);
        group.build_octree();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!group.intersect(&ray).did_hit);
    }

    #[test]
    fn intersect_returns_nearest_child() {
        let mut group = Composite::new("g", None);
        group.add_child(sphere_at("near", 0.0));
        group.add_child(Shape::Sphere(Sphere::new("far", Vec3::new(0.0, 0.0, -3.0), 0.2, None)));
        group.build_octree();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = group.intersect(&ray);
        assert!(hit.did_hit);
        assert_eq!(hit.shape_name, "near");
    }

    #[test]
    fn build_octree_stays_flat_under_leaf_capacity() {
        let mut group = Composite::new("g", None);
        for i in 0..10 {
            group.add_child(sphere_at(&format!("s{}", i), i as Float));
        }
        group.build_octree();
        assert_eq!(group.child_count(), 10);
    }

    #[test]
    fn build_octree_splits_once_over_capacity() {
        let mut group = Composite::new("g", None);
        for i in 0..(LEAF_CAPACITY + 8) {
            let x = (i % 8) as Float * 2.0 - 7.0;
            group.add_child(sphere_at(&format!("s{}", i), x));
        }
        group.build_octree();
        assert!(group.child_count() < LEAF_CAPACITY + 8);
        assert!(group.children.values().all(|c| matches!(c, Shape::Composite(_))));
    }

    #[test]
    fn build_octree_guards_against_degenerate_split() {
        // Every child sits at the same point: every octant would contain
        // all of them, so the split must be abandoned and the composite
        // stays a flat leaf despite exceeding LEAF_CAPACITY.
        let mut group = Composite::new("g", None);
        for i in 0..(LEAF_CAPACITY + 4) {
            group.add_child(sphere_at(&format!("s{}", i), 0.0));
        }
        group.build_octree();
        assert_eq!(group.child_count(), LEAF_CAPACITY + 4);
        assert!(group.children.values().all(|c| matches!(c, Shape::Sphere(_))));
    }

    #[test]
    fn octree_prunes_far_fewer_leaf_tests_than_a_flat_scan() {
        // 1000 small spheres scattered through a 10^3 box (§8 scenario 4).
        // A deterministic LCG stands in for an RNG so the test needs no
        // external seed and is reproducible across runs.
        let mut group = Composite::new("g", None);
        let mut state: u64 = 0x2545F4914F6CDD1D;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ((state >> 33) as i64 % 10000) as Float / 1000.0 - 5.0
        };
        let n = 1000;
        for i in 0..n {
            let center = Vec3::new(next(), next(), next());
            group.add_child(Shape::Sphere(Sphere::new(format!("s{}", i), center, 0.05, None)));
        }
        group.build_octree();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, -1.0));

        crate::shapes::sphere::intersect_calls::reset();
        group.intersect(&ray);
        let octree_calls = crate::shapes::sphere::intersect_calls::get();

        assert!(
            octree_calls < n / 4,
            "octree traversal tested {} of {} spheres, expected far fewer",
            octree_calls,
            n
        );
    }
}
