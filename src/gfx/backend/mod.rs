//! # Graphics Backend
//!
//! The scene core never talks to a GPU API directly. Everything it needs from
//! the host graphics context is expressed by the [`GraphicsContext`] trait: a
//! GL-style capability set of buffer lifecycle, program introspection, render
//! state, uniform upload and indexed draws.
//!
//! Handles are plain integer names, the way GL hands them out. A backend maps
//! them to whatever its native objects are.
//!
//! [`RecordingContext`] is the headless backend shipped with the crate. It
//! records every call and is what the tests drive.

pub mod recording;

pub use recording::{GpuCommand, RecordingContext};

use crate::error::ShaderError;
use crate::gfx::bindings::{AttributeLayout, UniformValue};

/// GPU buffer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Linked shader program name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Texture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Resolved uniform location within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Buffer binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data
    Array,
    /// Triangle indices
    ElementArray,
}

/// Upload usage hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageHint {
    StaticDraw,
    DynamicDraw,
}

/// Typed numeric payload for a buffer upload.
#[derive(Debug, Clone, Copy)]
pub enum BufferData<'a> {
    F32(&'a [f32]),
    U16(&'a [u16]),
}

impl<'a> BufferData<'a> {
    /// Raw bytes as they are handed to the GPU.
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            BufferData::F32(data) => bytemuck::cast_slice(data),
            BufferData::U16(data) => bytemuck::cast_slice(data),
        }
    }

    /// Number of elements (not bytes).
    pub fn len(&self) -> usize {
        match self {
            BufferData::F32(data) => data.len(),
            BufferData::U16(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Toggleable pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    Blend,
    CullFace,
}

/// Which framebuffer planes a clear touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR_AND_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// Capability set the scene core consumes from the host graphics context.
pub trait GraphicsContext {
    // Buffer lifecycle

    fn create_buffer(&mut self, target: BufferTarget) -> BufferId;

    /// Binds `buffer` to `target` and replaces its contents.
    fn upload_buffer(
        &mut self,
        target: BufferTarget,
        buffer: BufferId,
        data: BufferData<'_>,
        usage: UsageHint,
    );

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId);

    fn delete_buffer(&mut self, buffer: BufferId);

    // Programs

    /// Compiles both stages and links them into a program.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramId, ShaderError>;

    fn delete_program(&mut self, program: ProgramId);

    /// `None` when the program has no active attribute with this name.
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    /// `None` when the program has no active uniform with this name.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn use_program(&mut self, program: ProgramId);

    // Per-frame state

    fn clear_color(&mut self, color: wgpu::Color);
    fn clear_depth(&mut self, depth: f32);
    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);
    fn depth_func(&mut self, func: wgpu::CompareFunction);
    fn blend_func(&mut self, src: wgpu::BlendFactor, dst: wgpu::BlendFactor);
    fn clear(&mut self, mask: ClearMask);

    // Draw calls

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    /// Describes the layout of the buffer currently bound to [`BufferTarget::Array`].
    fn vertex_attrib_pointer(&mut self, location: u32, layout: &AttributeLayout);

    fn enable_vertex_attrib_array(&mut self, location: u32);

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    /// Draws `count` indices from the bound element buffer.
    fn draw_elements(
        &mut self,
        topology: wgpu::PrimitiveTopology,
        count: u32,
        format: wgpu::IndexFormat,
        offset: u64,
    );
}
