//! Ambient and point lights. The path-traced shading kernel (§4.4) does not
//! sample these directly — only emissive materials contribute direct
//! light — but the SDF format still defines them and the loader still
//! builds and stores them on `Scene` for completeness (see the Open
//! Questions resolution in the design doc).

use crate::core::color::Color;
use crate::core::numeric::Float;
use crate::core::vector::Vec3;

#[derive(Debug, Clone)]
pub struct Light {
    pub name: String,
    pub color: Color,
    pub brightness: Float,
}

impl Light {
    pub fn new(name: impl Into<String>, color: Color, brightness: Float) -> Light {
        Light {
            name: name.into(),
            color,
            brightness,
        }
    }

    pub fn intensity(&self) -> Color {
        self.color * self.brightness
    }
}

impl Default for Light {
    fn default() -> Light {
        Light::new("default", Color::WHITE, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub light: Light,
    pub position: Vec3,
}

impl PointLight {
    pub fn new(name: impl Into<String>, position: Vec3, color: Color, brightness: Float) -> PointLight {
        PointLight {
            light: Light::new(name, color, brightness),
            position,
        }
    }

    pub fn intensity(&self) -> Color {
        self.light.intensity()
    }
}
