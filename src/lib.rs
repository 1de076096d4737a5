//! `octatrace` is a small offline, physically-based path tracer.
//!
//! A textual scene description (SDF format, §6 of the design doc) is parsed
//! into a [`scene::Scene`]: a tree of [`shapes::Shape`] values accelerated by
//! an octree ([`shapes::Composite`]), plus materials, lights and a camera.
//! [`render::Renderer`] then traces the scene with a multi-threaded,
//! Monte-Carlo path tracer and writes a tone-mapped PPM image.
//!
//! The crate is organized the way the pipeline runs:
//!
//! - [`core`] — value types shared by every stage (rays, hit points, colors,
//!   materials, the camera, vector/matrix math, the crate's error type).
//! - [`shapes`] — geometric primitives and the octree-accelerated composite.
//! - [`scene`] — the SDF grammar, the OBJ/MTL subset loader, and the `Scene`
//!   they build.
//! - [`render`] — the pixel scheduler, shading kernel, denoiser and PPM
//!   writer.

pub mod core;
pub mod render;
pub mod scene;
pub mod shapes;

pub use crate::core::error::{RenderError, Result};
