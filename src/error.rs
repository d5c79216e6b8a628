//! Error Types
//!
//! Failure modes of the scene core, grouped by when they can happen:
//!
//! - [`ConstructionError`]: bad geometry, raised synchronously before any GPU
//!   resource is allocated.
//! - [`ShaderError`]: shader fetch or compile/link failure. Terminal for the
//!   affected primitive only.
//! - [`BindingError`]: a uniform name the compiled program does not expose.
//! - [`LightError`]: a light list is already at capacity.
//!
//! [`SceneError`] wraps all of them for the [`Scene`](crate::gfx::scene::Scene)
//! API, which returns [`Result<T>`].

use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::scene::PrimitiveId;

/// Invalid geometry handed to a primitive constructor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Every point needs exactly one normal.
    #[error("you must give a normal for each point ({points} points, {normals} normals)")]
    NormalCountMismatch { points: usize, normals: usize },

    /// Every point needs exactly one texture coordinate.
    #[error("you must give a texture coordinate for each point ({points} points, {tex_coords} texture coordinates)")]
    TexCoordCountMismatch { points: usize, tex_coords: usize },

    /// A triangle references a point that does not exist.
    #[error("triangle {triangle} references vertex {index}, but only {points} points exist")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        points: usize,
    },

    /// Indices are uploaded as 16-bit values.
    #[error("{points} points cannot be addressed by 16-bit indices")]
    TooManyVertices { points: usize },
}

/// Shader retrieval or program build failure.
#[derive(Error, Debug)]
pub enum ShaderError {
    /// Reading a shader source failed.
    #[error("couldn't fetch shader {path:?}: {source}")]
    Fetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The loader has no source registered under this key.
    #[error("no shader source registered for {0:?}")]
    Missing(String),

    /// A shader stage failed to compile.
    #[error("shader compilation failed: {0}")]
    Compile(String),

    /// The compiled stages failed to link into a program.
    #[error("program link failed: {0}")]
    Link(String),
}

/// Location resolution failure against a compiled program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("uniform {name:?} not found in the compiled program")]
    MissingUniform { name: String },
}

/// Which light list a [`LightError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
}

impl std::fmt::Display for LightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightKind::Directional => f.write_str("directional"),
            LightKind::Point => f.write_str("point"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightError {
    #[error("cannot add another {kind} light: capacity of {capacity} reached")]
    CapacityExceeded { kind: LightKind, capacity: usize },
}

/// The main error type of the scene API.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Light(#[from] LightError),

    /// No primitive with this id is registered.
    #[error("no primitive {0} in the scene")]
    UnknownPrimitive(PrimitiveId),

    /// The primitive's program failed earlier and it will never become ready.
    #[error("primitive {0} failed to load its shader program")]
    PrimitiveFailed(PrimitiveId),
}

/// Result alias used throughout the scene API.
pub type Result<T> = std::result::Result<T, SceneError>;
