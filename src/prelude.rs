//! # Glint Prelude
//!
//! Commonly used types in one import.
//!
//! ```rust
//! use glint::prelude::*;
//!
//! let scene = Scene::new(RecordingContext::new(), SceneConfig::default());
//! assert!(scene.is_empty());
//! ```

// Errors
pub use crate::error::{Result, SceneError};

// Backend
pub use crate::gfx::backend::{BufferId, GraphicsContext, RecordingContext, TextureId};

// Bindings
pub use crate::gfx::bindings::{AttributeLayout, DataType, FrameContext, UniformSource};

// Geometry and scene types
pub use crate::gfx::geometry::{cube, icosahedron, plane, ui_quad, GeometryData};
pub use crate::gfx::scene::{
    BindingPreset, DirectionalLight, PointLight, Primitive, PrimitiveDescriptor, PrimitiveId,
    Scene, SceneConfig, ScreenRect, Transform,
};
pub use crate::gfx::shader::{FileShaderLoader, ShaderLoader, StaticShaderLoader};

// Common external dependencies
pub use cgmath::{Deg, Rad, Vector3};
