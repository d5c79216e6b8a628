//! # Graphics Module
//!
//! Everything between a scene description and the GPU calls that draw it.
//!
//! ## Architecture Overview
//!
//! - **Backend** ([`backend`]) - The [`GraphicsContext`](backend::GraphicsContext)
//!   capability set and a recording implementation of it
//! - **Bindings** ([`bindings`]) - Data-driven attribute and uniform dispatch
//! - **Camera** ([`camera`]) - Perspective projection and view matrices
//! - **Geometry** ([`geometry`]) - Geometry tables and built-in shapes
//! - **Scene Management** ([`scene`]) - Primitives, lights and the render loop
//! - **Shaders** ([`shader`]) - Asynchronous source loading and program lifecycle
//!
//! [`Scene`]: scene::Scene

pub mod backend;
pub mod bindings;
pub mod camera;
pub mod geometry;
pub mod scene;
pub mod shader;

// Re-export commonly used types
pub use camera::PerspectiveCamera;
pub use scene::{Primitive, Scene};
