//! # Camera
//!
//! A perspective camera placed by a translation and a per-axis rotation.
//! The projection, view and view-rotation matrices are rebuilt on every
//! setter call, so they never lag behind the camera parameters.

pub mod perspective_camera;

pub use perspective_camera::PerspectiveCamera;
