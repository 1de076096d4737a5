//! Path-traced shading kernel (§4.4): `shade` dispatches on material class,
//! `diffuse`/`reflection`/`refraction` each recurse back through `trace`,
//! and `schlick_reflectance` is the Fresnel term the dielectric and glossy
//! channels share.

use crate::core::color::Color;
use crate::core::hit::HitPoint;
use crate::core::material::{Material, MaterialClass};
use crate::core::numeric::{clamp, Float, EPSILON, PI};
use crate::core::ray::Ray;
use crate::core::vector::Vec3;
use crate::scene::Scene;
use rand::Rng;
use std::sync::Arc;

pub fn get_closest_hit(ray: &Ray, scene: &Scene) -> HitPoint {
    scene.root.intersect(ray)
}

/// Traces one ray to its closest hit and shades it, or returns black on a
/// miss. `samples` is the Monte-Carlo sample count `shade` passes down to
/// `diffuse`; every bounce below the primary hit traces with a single
/// sample (§4.4 rationale).
pub fn trace(ray: &Ray, scene: &Scene, samples: u32, bounce: u32, max_bounces: u32, rng: &mut impl Rng) -> Color {
    let hit = get_closest_hit(ray, scene);
    if !hit.did_hit {
        return Color::BLACK;
    }
    shade(&hit, scene, samples, bounce, max_bounces, rng)
}

fn hit_material(hit: &HitPoint) -> Arc<Material> {
    hit.material.clone().unwrap_or_else(|| Arc::new(Material::default()))
}

pub fn shade(hit: &HitPoint, scene: &Scene, samples: u32, bounce: u32, max_bounces: u32, rng: &mut impl Rng) -> Color {
    if bounce >= max_bounces {
        return Color::BLACK;
    }
    let material = hit_material(hit);
    let mut bounced = Color::BLACK;

    match material.class() {
        MaterialClass::Dielectric => {
            let r = schlick_reflectance(hit.incoming, hit.normal, material.ior);
            bounced += reflection(hit, scene, samples, bounce, max_bounces, rng) * r;
            bounced += refraction(hit, scene, samples, bounce, max_bounces, rng) * (1.0 - r) * (1.0 - material.opacity);
        }
        MaterialClass::Glossy => {
            let schlick = schlick_reflectance(hit.incoming, hit.normal, material.ior);
            let r = material.glossy + (1.0 - material.glossy) * schlick;
            if r < 1.0 {
                bounced += diffuse(hit, scene, samples, bounce, max_bounces, rng);
                bounced *= 1.0 - r;
            }
            bounced += reflection(hit, scene, samples, bounce, max_bounces, rng) * r;
        }
        MaterialClass::Transparent => {
            bounced += refraction(hit, scene, samples, bounce, max_bounces, rng) * (1.0 - material.opacity);
        }
        MaterialClass::Diffuse => {
            bounced += diffuse(hit, scene, samples, bounce, max_bounces, rng);
        }
    }
    bounced
}

/// Draws a direction uniform on the unit sphere: yaw ~ U(-π, π), sin(pitch)
/// ~ U(-1, 1).
fn uniform_sphere_direction(rng: &mut impl Rng) -> Vec3 {
    let yaw = rng.gen_range(-1.0, 1.0) * PI;
    let pitch = rng.gen_range(-1.0f32, 1.0f32).asin();
    let cos_pitch = pitch.cos();
    Vec3::new(cos_pitch * yaw.cos(), pitch.sin(), cos_pitch * yaw.sin())
}

pub fn diffuse(hit: &HitPoint, scene: &Scene, samples: u32, bounce: u32, max_bounces: u32, rng: &mut impl Rng) -> Color {
    let material = hit_material(hit);
    let mut bounced = Color::BLACK;

    for _ in 0..samples {
        let mut dir = uniform_sphere_direction(rng);
        let mut cos_theta = hit.normal.dot(dir);
        if cos_theta < 0.0 {
            dir = -dir;
            cos_theta = -cos_theta;
        }
        let bounce_ray = Ray::new(hit.position, dir);
        bounced += trace(&bounce_ray, scene, 1, bounce + 1, max_bounces, rng) * 2.0 * cos_theta;
    }
    if samples > 1 {
        bounced *= 1.0 / samples as Float;
    }
    material.emit_color + bounced * material.kd
}

pub fn reflection(hit: &HitPoint, scene: &Scene, samples: u32, bounce: u32, max_bounces: u32, rng: &mut impl Rng) -> Color {
    let material = hit_material(hit);
    let cos_incoming = -hit.normal.dot(hit.incoming);
    let reflect_dir = hit.incoming + hit.normal * cos_incoming * 2.0;
    let reflect_ray = Ray::new(hit.position, reflect_dir);
    trace(&reflect_ray, scene, samples, bounce + 1, max_bounces, rng) * material.ks
}

pub fn refraction(hit: &HitPoint, scene: &Scene, samples: u32, bounce: u32, max_bounces: u32, rng: &mut impl Rng) -> Color {
    let material = hit_material(hit);
    let mut eta = 1.0 / material.ior;
    let mut normal = hit.normal;
    let mut cos_incoming = -normal.dot(hit.incoming);

    if cos_incoming < 0.0 {
        eta = 1.0 / eta;
        cos_incoming = -cos_incoming;
        normal = -normal;
    }
    let cos_outgoing_sq = 1.0 - eta * eta * (1.0 - cos_incoming * cos_incoming);
    if cos_outgoing_sq < 0.0 {
        return reflection(hit, scene, samples, bounce, max_bounces, rng);
    }
    let refract_dir = hit.incoming * eta + normal * (eta * cos_incoming - cos_outgoing_sq.sqrt());
    let refract_ray = Ray::new(hit.position - normal * (2.0 * EPSILON), refract_dir);
    trace(&refract_ray, scene, samples, bounce + 1, max_bounces, rng) * material.kd
}

/// Schlick's approximation to the Fresnel reflectance. `cos_in` is
/// recomputed from the outgoing side when entering a denser medium so the
/// formula stays valid past the critical angle (returns 1 — total internal
/// reflection — when it is).
pub fn schlick_reflectance(ray_dir: Vec3, normal: Vec3, ior: Float) -> Float {
    let mut n1 = 1.0;
    let mut n2 = ior;
    let mut cos_incoming = -normal.dot(ray_dir);

    if cos_incoming < 0.0 {
        std::mem::swap(&mut n1, &mut n2);
        cos_incoming = -cos_incoming;
    }
    if n1 > n2 {
        let eta = n1 / n2;
        let sin_outgoing_sq = eta * eta * (1.0 - cos_incoming * cos_incoming);
        if sin_outgoing_sq >= 1.0 {
            return 1.0;
        }
        cos_incoming = (1.0 - sin_outgoing_sq).sqrt();
    }
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    let factor = clamp(1.0 - cos_incoming, 0.0, 1.0);
    r0 + (1.0 - r0) * factor.powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schlick_is_near_normal_incidence_minimum() {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let ray_dir = Vec3::new(0.0, 0.0, -1.0);
        let r = schlick_reflectance(ray_dir, normal, 1.5);
        let r0 = ((1.0 - 1.5f32) / (1.0 + 1.5f32)).powi(2);
        assert!((r - r0).abs() < 1e-4);
    }

    #[test]
    fn schlick_grazing_incidence_approaches_total_reflectance() {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let ray_dir = Vec3::new(0.999, 0.0446, 0.0).normalized();
        let r = schlick_reflectance(ray_dir, normal, 1.5);
        assert!(r > 0.9);
    }

    #[test]
    fn schlick_is_monotonic_from_normal_to_grazing() {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let mut previous = 0.0;
        for i in 1..20 {
            let angle = (i as Float / 20.0) * (PI / 2.0 - 0.01);
            let ray_dir = Vec3::new(angle.sin(), 0.0, -angle.cos());
            let r = schlick_reflectance(ray_dir, normal, 1.5);
            assert!(r >= previous - 1e-4);
            previous = r;
        }
    }

    #[test]
    fn refraction_falls_back_to_reflection_past_critical_angle() {
        // A grazing ray exiting a dense medium (ior far below 1 from the
        // inside) should hit total internal reflection and defer to
        // `reflection`, returning a finite, non-panicking color.
        let hit = HitPoint {
            did_hit: true,
            t: 1.0,
            shape_name: "s".into(),
            material: Some(Arc::new(Material::with_ior(
                "glass",
                Color::BLACK,
                Color::new(0.9, 0.9, 0.9),
                Color::new(0.2, 0.2, 0.2),
                0.0,
                0.0,
                0.0,
                0.0,
                1.5,
            ))),
            position: Vec3::new(0.0, 0.0, 0.0),
            incoming: Vec3::new(0.999, 0.0446, 0.0).normalized(),
            normal: Vec3::new(0.0, 0.0, 1.0),
        };
        let scene = Scene::new();
        let mut rng = rand::thread_rng();
        let c = refraction(&hit, &scene, 1, 5, 4, &mut rng);
        assert_eq!(c, Color::BLACK);
    }
}
