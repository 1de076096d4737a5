//! PPM image output (§6): standard P3 (ASCII) or P6 (binary), 8-bit per
//! channel, row-major with the y axis flipped to match screen conventions.
//! Colors arriving here are assumed already tone-mapped (§4.3 stores the
//! tone-mapped value directly into the color buffer).

use crate::core::color::Color;
use crate::core::error::RenderError;
use std::io::Write;
use std::path::Path;

fn quantize(c: Color) -> [u8; 3] {
    let to_byte = |v: f32| (v.max(0.0).min(1.0) * 255.0).round() as u8;
    [to_byte(c.r), to_byte(c.g), to_byte(c.b)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpmFormat {
    Ascii,
    Binary,
}

/// Writes `pixels` (row-major, `width × height`, top row first) to `path`
/// with the y axis inverted, since the renderer's image-plane convention
/// has +y pointing up while PPM scans top-to-bottom.
pub fn write_ppm(path: &Path, width: u32, height: u32, pixels: &[Color], format: PpmFormat) -> Result<(), RenderError> {
    let file = std::fs::File::create(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = std::io::BufWriter::new(file);
    let write_err = |source: std::io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    match format {
        PpmFormat::Ascii => {
            writeln!(out, "P3").map_err(write_err)?;
            writeln!(out, "{} {}", width, height).map_err(write_err)?;
            writeln!(out, "255").map_err(write_err)?;
            for row in (0..height).rev() {
                for col in 0..width {
                    let [r, g, b] = quantize(pixels[(row * width + col) as usize]);
                    write!(out, "{} {} {} ", r, g, b).map_err(write_err)?;
                }
                writeln!(out).map_err(write_err)?;
            }
        }
        PpmFormat::Binary => {
            writeln!(out, "P6").map_err(write_err)?;
            writeln!(out, "{} {}", width, height).map_err(write_err)?;
            writeln!(out, "255").map_err(write_err)?;
            for row in (0..height).rev() {
                for col in 0..width {
                    let rgb = quantize(pixels[(row * width + col) as usize]);
                    out.write_all(&rgb).map_err(write_err)?;
                }
            }
        }
    }
    out.flush().map_err(write_err)?;
    Ok(())
}
