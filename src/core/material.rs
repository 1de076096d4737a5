//! Phong-ish surface reflectance parameters. Materials are built once by the
//! loader and shared by `Arc` from then on — nothing mutates a `Material`
//! after construction.

use crate::core::color::Color;
use crate::core::numeric::Float;

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub ka: Color,
    pub kd: Color,
    pub ks: Color,
    pub m: Float,
    pub glossy: Float,
    pub opacity: Float,
    pub emittance: Float,
    pub ior: Float,
    pub emit_color: Color,
}

/// The mutually exclusive light-transport channels `shade` dispatches on,
/// in priority order (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialClass {
    Dielectric,
    Glossy,
    Transparent,
    Diffuse,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        ka: Color,
        kd: Color,
        ks: Color,
        m: Float,
        glossy: Float,
        opacity: Float,
        emittance: Float,
    ) -> Material {
        Material::with_ior(name, ka, kd, ks, m, glossy, opacity, emittance, 1.0)
    }

    pub fn with_ior(
        name: impl Into<String>,
        ka: Color,
        kd: Color,
        ks: Color,
        m: Float,
        glossy: Float,
        opacity: Float,
        emittance: Float,
        ior: Float,
    ) -> Material {
        Material {
            name: name.into(),
            ka,
            kd,
            ks,
            m,
            glossy,
            opacity,
            emittance,
            ior,
            emit_color: kd * emittance,
        }
    }

    pub fn default_named(name: impl Into<String>) -> Material {
        Material::new(
            name,
            Color::BLACK,
            Color::new(0.5, 0.5, 0.5),
            Color::BLACK,
            0.0,
            0.0,
            1.0,
            0.0,
        )
    }

    pub fn class(&self) -> MaterialClass {
        if self.glossy > 0.0 && self.opacity < 1.0 {
            MaterialClass::Dielectric
        } else if self.glossy > 0.0 {
            MaterialClass::Glossy
        } else if self.opacity < 1.0 {
            MaterialClass::Transparent
        } else {
            MaterialClass::Diffuse
        }
    }
}

impl Default for Material {
    fn default() -> Material {
        Material::default_named("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_color_tracks_kd_and_emittance() {
        let mat = Material::new(
            "light",
            Color::BLACK,
            Color::new(1.0, 0.5, 0.25),
            Color::BLACK,
            0.0,
            0.0,
            1.0,
            5.0,
        );
        assert_eq!(mat.emit_color, Color::new(5.0, 2.5, 1.25));
    }

    #[test]
    fn classification_priority_matches_spec() {
        let mut mat = Material::default_named("m");
        mat.glossy = 0.3;
        mat.opacity = 0.4;
        assert_eq!(mat.class(), MaterialClass::Dielectric);

        mat.opacity = 1.0;
        assert_eq!(mat.class(), MaterialClass::Glossy);

        mat.glossy = 0.0;
        mat.opacity = 0.2;
        assert_eq!(mat.class(), MaterialClass::Transparent);

        mat.opacity = 1.0;
        assert_eq!(mat.class(), MaterialClass::Diffuse);
    }
}
