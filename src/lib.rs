//! Glint 3D Scene Core
//!
//! A small retained-mode scene graph: primitives with data-driven uniform and
//! attribute bindings, a perspective camera, capped light arrays, and a render
//! loop that issues its GPU calls through a pluggable
//! [`GraphicsContext`](gfx::backend::GraphicsContext).

pub mod error;
pub mod gfx;
pub mod prelude;

// Re-export main types for convenience
pub use error::{Result, SceneError};
pub use gfx::scene::{Scene, SceneConfig};
