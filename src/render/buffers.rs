//! The three auxiliary super-sampled buffers the scheduler writes alongside
//! color — normal, distance, material — feeding the edge-preserving
//! denoiser (§4.5).

use crate::core::color::Color;
use crate::core::material::Material;
use crate::core::numeric::Float;
use crate::core::vector::Vec3;
use std::cell::UnsafeCell;
use std::sync::Arc;

#[derive(Clone)]
pub struct FrameBuffers {
    pub width: u32,
    pub height: u32,
    pub color: Vec<Color>,
    pub normal: Vec<Vec3>,
    pub distance: Vec<Float>,
    pub material: Vec<Option<Arc<Material>>>,
}

impl FrameBuffers {
    pub fn new(width: u32, height: u32) -> FrameBuffers {
        let n = (width * height) as usize;
        FrameBuffers {
            width,
            height,
            color: vec![Color::BLACK; n],
            normal: vec![Vec3::splat(0.5); n],
            distance: vec![1.0; n],
            material: vec![None; n],
        }
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Averages each `factor × factor` block of the super-sampled buffers
    /// into a `width/factor × height/factor` color buffer (the
    /// anti-aliasing downsample, §4.3).
    pub fn downsample(&self, factor: u32) -> Vec<Color> {
        let out_w = self.width / factor;
        let out_h = self.height / factor;
        let mut out = vec![Color::BLACK; (out_w * out_h) as usize];

        for oy in 0..out_h {
            for ox in 0..out_w {
                let mut sum = Color::BLACK;
                for dy in 0..factor {
                    for dx in 0..factor {
                        let idx = self.index(ox * factor + dx, oy * factor + dy);
                        sum += self.color[idx];
                    }
                }
                out[(oy * out_w + ox) as usize] = sum * (1.0 / (factor * factor) as Float);
            }
        }
        out
    }
}

/// Lets the worker pool write into `FrameBuffers` through a shared `&self`
/// reference instead of a `Mutex` (§5: "Color/normal/distance/material
/// buffers: shared mutable but partitioned by pixel index … Atomic pixel
/// index: the only contended datum"). Every pixel index is claimed by
/// exactly one thread before it writes, so two threads never touch the same
/// slot — `Sync` is sound under that invariant alone, with no locking
/// needed on the hot path.
pub struct PixelBuffers(UnsafeCell<FrameBuffers>);

unsafe impl Sync for PixelBuffers {}

impl PixelBuffers {
    pub fn new(width: u32, height: u32) -> PixelBuffers {
        PixelBuffers(UnsafeCell::new(FrameBuffers::new(width, height)))
    }

    /// Writes the auxiliary buffers at `idx`. Safety: the caller must hold
    /// exclusive claim on `idx` (i.e. it came from the shared pixel-index
    /// atomic and no other thread writes it concurrently).
    pub unsafe fn write_hit(&self, idx: usize, normal: Vec3, distance: Float, material: Option<Arc<Material>>) {
        let buffers = &mut *self.0.get();
        buffers.normal[idx] = normal;
        buffers.distance[idx] = distance;
        buffers.material[idx] = material;
    }

    /// Writes the tone-mapped color at `idx`. Same safety contract as
    /// [`write_hit`](Self::write_hit).
    pub unsafe fn write_color(&self, idx: usize, color: Color) {
        (&mut *self.0.get()).color[idx] = color;
    }

    pub fn into_inner(self) -> FrameBuffers {
        self.0.into_inner()
    }
}
