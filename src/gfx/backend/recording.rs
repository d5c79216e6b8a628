//! Headless backend that records every call instead of issuing it.
//!
//! Programs are "compiled" by scanning the GLSL sources for `attribute`/`in`
//! declarations in the vertex stage and `uniform` declarations in either
//! stage, so location lookups behave like a real driver's introspection:
//! names the shader never declares are not found.

use std::collections::HashMap;

use super::{
    BufferData, BufferId, BufferTarget, Capability, ClearMask, GraphicsContext, ProgramId,
    TextureId, UniformLocation, UsageHint,
};
use crate::error::ShaderError;
use crate::gfx::bindings::{AttributeLayout, UniformValue};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CreateBuffer {
        target: BufferTarget,
        buffer: BufferId,
    },
    UploadBuffer {
        target: BufferTarget,
        buffer: BufferId,
        bytes: usize,
        usage: UsageHint,
    },
    BindBuffer {
        target: BufferTarget,
        buffer: BufferId,
    },
    DeleteBuffer(BufferId),
    CompileProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(ProgramId),
    ClearColor(wgpu::Color),
    ClearDepth(f32),
    Enable(Capability),
    Disable(Capability),
    DepthFunc(wgpu::CompareFunction),
    BlendFunc {
        src: wgpu::BlendFactor,
        dst: wgpu::BlendFactor,
    },
    Clear(ClearMask),
    BindTexture {
        unit: u32,
        texture: Option<TextureId>,
    },
    VertexAttribPointer {
        location: u32,
        layout: AttributeLayout,
    },
    EnableVertexAttribArray(u32),
    SetUniform {
        location: UniformLocation,
        value: UniformValue,
    },
    DrawElements {
        topology: wgpu::PrimitiveTopology,
        count: u32,
        format: wgpu::IndexFormat,
        offset: u64,
    },
}

/// Active attribute and uniform names of a linked program, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ProgramInterface {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<GpuCommand>,
    next_name: u32,
    buffers: HashMap<BufferId, Vec<u8>>,
    programs: HashMap<ProgramId, ProgramInterface>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded since creation or the last [`take_commands`](Self::take_commands).
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Last uploaded contents of a live buffer.
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of recorded draw calls.
    pub fn draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, GpuCommand::DrawElements { .. }))
            .count()
    }

    /// Hands out a texture name. Texture decoding is the host's business.
    pub fn create_texture(&mut self) -> TextureId {
        TextureId(self.next())
    }

    fn next(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn record(&mut self, command: GpuCommand) {
        log::trace!("gpu: {:?}", command);
        self.commands.push(command);
    }
}

impl GraphicsContext for RecordingContext {
    fn create_buffer(&mut self, target: BufferTarget) -> BufferId {
        let buffer = BufferId(self.next());
        self.buffers.insert(buffer, Vec::new());
        self.record(GpuCommand::CreateBuffer { target, buffer });
        buffer
    }

    fn upload_buffer(
        &mut self,
        target: BufferTarget,
        buffer: BufferId,
        data: BufferData<'_>,
        usage: UsageHint,
    ) {
        let bytes = data.as_bytes();
        self.buffers.insert(buffer, bytes.to_vec());
        self.record(GpuCommand::UploadBuffer {
            target,
            buffer,
            bytes: bytes.len(),
            usage,
        });
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferId) {
        self.record(GpuCommand::BindBuffer { target, buffer });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.record(GpuCommand::DeleteBuffer(buffer));
    }

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramId, ShaderError> {
        if !has_entry_point(vertex_source) {
            return Err(ShaderError::Compile(
                "vertex shader has no main()".to_string(),
            ));
        }
        if !has_entry_point(fragment_source) {
            return Err(ShaderError::Compile(
                "fragment shader has no main()".to_string(),
            ));
        }

        let mut interface = ProgramInterface::default();
        let mut outputs = Vec::new();
        for declaration in declarations(vertex_source) {
            match declaration {
                Declaration::Attribute(name) => push_unique(&mut interface.attributes, name),
                Declaration::Uniform(name) => push_unique(&mut interface.uniforms, name),
                Declaration::Varying(name) => outputs.push(name),
            }
        }
        for declaration in declarations(fragment_source) {
            match declaration {
                Declaration::Uniform(name) => push_unique(&mut interface.uniforms, name),
                Declaration::Varying(name) if !outputs.contains(&name) => {
                    return Err(ShaderError::Link(format!(
                        "varying {:?} is not written by the vertex shader",
                        name
                    )));
                }
                _ => {}
            }
        }

        let program = ProgramId(self.next());
        log::debug!(
            "linked program {:?}: {} attributes, {} uniforms",
            program,
            interface.attributes.len(),
            interface.uniforms.len()
        );
        self.programs.insert(program, interface);
        self.record(GpuCommand::CompileProgram(program));
        Ok(program)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.record(GpuCommand::DeleteProgram(program));
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        self.programs
            .get(&program)?
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(&program)?
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| UniformLocation(index as u32))
    }

    fn use_program(&mut self, program: ProgramId) {
        self.record(GpuCommand::UseProgram(program));
    }

    fn clear_color(&mut self, color: wgpu::Color) {
        self.record(GpuCommand::ClearColor(color));
    }

    fn clear_depth(&mut self, depth: f32) {
        self.record(GpuCommand::ClearDepth(depth));
    }

    fn enable(&mut self, capability: Capability) {
        self.record(GpuCommand::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.record(GpuCommand::Disable(capability));
    }

    fn depth_func(&mut self, func: wgpu::CompareFunction) {
        self.record(GpuCommand::DepthFunc(func));
    }

    fn blend_func(&mut self, src: wgpu::BlendFactor, dst: wgpu::BlendFactor) {
        self.record(GpuCommand::BlendFunc { src, dst });
    }

    fn clear(&mut self, mask: ClearMask) {
        self.record(GpuCommand::Clear(mask));
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        self.record(GpuCommand::BindTexture { unit, texture });
    }

    fn vertex_attrib_pointer(&mut self, location: u32, layout: &AttributeLayout) {
        self.record(GpuCommand::VertexAttribPointer {
            location,
            layout: *layout,
        });
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.record(GpuCommand::EnableVertexAttribArray(location));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        self.record(GpuCommand::SetUniform {
            location,
            value: value.clone(),
        });
    }

    fn draw_elements(
        &mut self,
        topology: wgpu::PrimitiveTopology,
        count: u32,
        format: wgpu::IndexFormat,
        offset: u64,
    ) {
        self.record(GpuCommand::DrawElements {
            topology,
            count,
            format,
            offset,
        });
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Declaration {
    Attribute(String),
    Uniform(String),
    Varying(String),
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

fn has_entry_point(source: &str) -> bool {
    strip_comments(source).contains("void main")
}

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Top-level `attribute`, `in`, `uniform` and `varying` declarations of a GLSL
/// source.
fn declarations(source: &str) -> Vec<Declaration> {
    let source = strip_comments(source);
    let mut found = Vec::new();

    for statement in source.split([';', '{', '}']) {
        let mut statement = statement.trim();
        if statement.starts_with("layout") {
            match statement.find(')') {
                Some(end) => statement = statement[end + 1..].trim(),
                None => continue,
            }
        }

        let mut tokens = statement.split_whitespace();
        let make: fn(String) -> Declaration = match tokens.next() {
            Some("uniform") => Declaration::Uniform,
            Some("attribute") | Some("in") => Declaration::Attribute,
            Some("varying") => Declaration::Varying,
            _ => continue,
        };

        let mut rest: Vec<&str> = tokens.collect();
        while matches!(rest.first(), Some(&("lowp" | "mediump" | "highp"))) {
            rest.remove(0);
        }
        // Skip the type, everything after it is a comma separated name list
        if rest.len() < 2 {
            continue;
        }
        for name in rest[1..].join(" ").split(',') {
            let name = name.split('[').next().unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }
            found.push(make(name.to_string()));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "
        attribute vec3 aVertexPosition;
        attribute vec2 aTextureCoord; // uv
        uniform mat4 uProjectionMatrix;
        uniform highp vec3 uLights[64], uColors[64];
        void main() { gl_Position = uProjectionMatrix * vec4(aVertexPosition, 1.0); }
        uniform float uLate;
    ";

    const FRAGMENT: &str = "
        precision mediump float;
        uniform sampler2D uSampler;
        void main() { gl_FragColor = vec4(1.0); }
    ";

    #[test]
    fn test_declarations_are_scanned_in_order() {
        let mut context = RecordingContext::new();
        let program = context.compile_program(VERTEX, FRAGMENT).unwrap();

        assert_eq!(context.attribute_location(program, "aVertexPosition"), Some(0));
        assert_eq!(context.attribute_location(program, "aTextureCoord"), Some(1));
        assert_eq!(context.attribute_location(program, "aVertexNormal"), None);

        assert_eq!(
            context.uniform_location(program, "uProjectionMatrix"),
            Some(UniformLocation(0))
        );
        assert_eq!(
            context.uniform_location(program, "uColors"),
            Some(UniformLocation(2))
        );
        assert_eq!(
            context.uniform_location(program, "uLate"),
            Some(UniformLocation(3))
        );
        assert_eq!(
            context.uniform_location(program, "uSampler"),
            Some(UniformLocation(4))
        );
    }

    #[test]
    fn test_layout_qualified_inputs() {
        let found = declarations("layout(location = 0) in vec3 position;\nvoid main() {}");
        assert_eq!(found, vec![Declaration::Attribute("position".to_string())]);
    }

    #[test]
    fn test_missing_entry_point_fails_compilation() {
        let mut context = RecordingContext::new();
        let result = context.compile_program("attribute vec3 a;", FRAGMENT);
        assert!(matches!(result, Err(ShaderError::Compile(_))));
        assert!(context.commands().is_empty());
    }

    #[test]
    fn test_unmatched_varying_fails_linking() {
        let mut context = RecordingContext::new();
        let vertex = "attribute vec3 aPosition;\nvarying vec3 vNormal;\nvoid main() {}";
        let fragment = "varying vec3 vNormal;\nvarying vec2 vUv;\nvoid main() {}";
        let result = context.compile_program(vertex, fragment);
        assert!(matches!(result, Err(ShaderError::Link(message)) if message.contains("vUv")));
        assert!(context.commands().is_empty());

        let fragment = "varying highp vec3 vNormal;\nvoid main() {}";
        assert!(context.compile_program(vertex, fragment).is_ok());
    }

    #[test]
    fn test_buffer_lifecycle_is_tracked() {
        let mut context = RecordingContext::new();
        let buffer = context.create_buffer(BufferTarget::Array);
        context.upload_buffer(
            BufferTarget::Array,
            buffer,
            BufferData::F32(&[1.0, 2.0]),
            UsageHint::StaticDraw,
        );
        assert_eq!(context.buffer_contents(buffer).map(<[u8]>::len), Some(8));
        assert_eq!(context.live_buffers(), 1);

        context.delete_buffer(buffer);
        assert_eq!(context.live_buffers(), 0);
        assert_eq!(context.commands().len(), 3);
    }
}
