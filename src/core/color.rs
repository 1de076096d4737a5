//! Linear RGB color. Addition, component-wise (Hadamard) multiplication and
//! scalar multiplication are the only algebra the shading kernel needs.

use crate::core::numeric::Float;
use std::ops::{Add, AddAssign, Mul, MulAssign};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: Float,
    pub g: Float,
    pub b: Float,
}

impl Color {
    pub const fn new(r: Float, g: Float, b: Float) -> Color {
        Color { r, g, b }
    }

    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// `c / (c + 1)` per channel — the one tone-mapping operator this
    /// renderer uses, applied exactly once per pixel in `primary_trace`.
    pub fn tone_mapped(self) -> Color {
        Color::new(
            self.r / (self.r + 1.0),
            self.g / (self.g + 1.0),
            self.b / (self.b + 1.0),
        )
    }

    pub fn luminance(self) -> Float {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl Mul<Float> for Color {
    type Output = Color;
    fn mul(self, rhs: Float) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl MulAssign<Float> for Color {
    fn mul_assign(&mut self, rhs: Float) {
        *self = *self * rhs;
    }
}

impl Mul<Color> for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_map_is_bounded_below_one() {
        let c = Color::new(1_000_000.0, 1_000_000.0, 1_000_000.0).tone_mapped();
        assert!(c.r < 1.0 && c.r > 0.999);
        assert!(c.g < 1.0 && c.b < 1.0);
    }

    #[test]
    fn tone_map_of_black_is_black() {
        assert_eq!(Color::BLACK.tone_mapped(), Color::BLACK);
    }
}
