//! # Scene Management Module
//!
//! Retained-mode scene core: the [`Scene`] owns the graphics context, a
//! perspective camera, the light lists and every registered [`Primitive`],
//! and drives the per-frame render loop.
//!
//! ## Key Components
//!
//! - [`Scene`] - Camera, lights, primitive registry and render loop
//! - [`Primitive`] - Geometry, transform, binding table and shader lifecycle
//! - [`PrimitiveDescriptor`] - Builder-style construction parameters
//! - [`Transform`] - Translation, rotation and scale to model matrix
//! - [`lights`] - Light types and fixed-capacity uniform packing
//!
//! ## Update Flow
//!
//! Any camera change rebuilds the projection and view matrices and pushes the
//! new view, together with the world-space point lights, to every primitive.
//! Each primitive then recomputes its model-view matrix and re-expresses the
//! point lights in its view space. Drawing reads those cached values through
//! the primitive's binding table.
//!
//! ## Usage
//!
//! ```rust
//! use glint::gfx::backend::RecordingContext;
//! use glint::gfx::geometry::cube;
//! use glint::gfx::scene::{PrimitiveDescriptor, Scene, SceneConfig};
//! use glint::gfx::shader::StaticShaderLoader;
//! use cgmath::Vector3;
//!
//! let loader = StaticShaderLoader::new()
//!     .with_source("lit.vert", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/lit.vert")))
//!     .with_source("lit.frag", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/lit.frag")));
//!
//! let mut scene = Scene::new(RecordingContext::new(), SceneConfig::default());
//! let id = scene
//!     .spawn(
//!         PrimitiveDescriptor::new(cube(), "lit.vert", "lit.frag")
//!             .with_translation(Vector3::new(0.0, 0.0, -5.0)),
//!         &loader,
//!     )
//!     .unwrap();
//!
//! scene.finish_loading(id).unwrap();
//! scene.render();
//! assert_eq!(scene.context().draw_calls(), 1);
//! ```

pub mod lights;
pub mod object;
pub mod scene;
pub mod transform;

pub use lights::{DirectionalLight, LightSet, PointLight, MAX_LIGHTS};
pub use object::{BindingPreset, Primitive, PrimitiveDescriptor, PrimitiveId, ScreenRect};
pub use scene::{
    default_pre_render_instructions, PreRenderInstruction, Scene, SceneConfig, SceneState,
    ShaderFailure,
};
pub use transform::Transform;
