//! The one error type propagated across crate boundaries with `?`. Most of
//! §7's error kinds (`ParseError`, `MissingReference`, `PixelOutOfRange`,
//! `RenderOverflow`, `NumericEdge`) are *not* represented here: they're
//! recoverable by policy, so they're logged at the point of occurrence and
//! the caller carries on with a best-effort scene or image. A scene with no
//! `render` directive is also not an error (a scene file full of reusable
//! material definitions is a legitimate, if unusual, input) — `load_scene`
//! logs a warning for that case rather than failing. Only the fatal I/O
//! kind needs to travel up to `main`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RenderError>;
