use crate::error::BindingError;
use crate::gfx::backend::{BufferTarget, GraphicsContext, ProgramId, UniformLocation};

use super::{AttributeBinding, FrameContext, UniformSource};

/// A named uniform and the producer of its per-frame value.
#[derive(Debug)]
pub struct UniformBinding {
    pub name: String,
    pub source: UniformSource,
}

/// Ordered attribute and uniform bindings of one primitive.
///
/// Locations are kept index-aligned with the binding lists: entry `i` of
/// [`attribute_locations`](Self::attribute_locations) belongs to attribute
/// `i`. They are only valid after a successful [`resolve`](Self::resolve),
/// and every structural change needs a fresh one.
#[derive(Debug, Default)]
pub struct BindingTable {
    attributes: Vec<AttributeBinding>,
    uniforms: Vec<UniformBinding>,
    attribute_locations: Vec<Option<u32>>,
    uniform_locations: Vec<UniformLocation>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_attribute(&mut self, binding: AttributeBinding) {
        self.attributes.push(binding);
    }

    pub fn push_uniform(&mut self, name: impl Into<String>, source: UniformSource) {
        self.uniforms.push(UniformBinding {
            name: name.into(),
            source,
        });
    }

    pub(crate) fn pop_attribute(&mut self) -> Option<AttributeBinding> {
        self.attributes.pop()
    }

    pub(crate) fn pop_uniform(&mut self) -> Option<UniformBinding> {
        self.uniforms.pop()
    }

    pub fn attributes(&self) -> &[AttributeBinding] {
        &self.attributes
    }

    pub fn uniforms(&self) -> &[UniformBinding] {
        &self.uniforms
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|binding| binding.name.as_str())
    }

    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.uniforms.iter().map(|binding| binding.name.as_str())
    }

    pub fn attribute_locations(&self) -> &[Option<u32>] {
        &self.attribute_locations
    }

    pub fn uniform_locations(&self) -> &[UniformLocation] {
        &self.uniform_locations
    }

    /// Whether the cached locations line up with the current binding lists.
    pub fn is_resolved(&self) -> bool {
        self.attribute_locations.len() == self.attributes.len()
            && self.uniform_locations.len() == self.uniforms.len()
    }

    /// Looks up every attribute and uniform location in `program`.
    ///
    /// Attributes the program does not use resolve to `None` and are skipped
    /// when drawing. A missing uniform is an error; the previous locations are
    /// left untouched in that case.
    pub fn resolve<G>(&mut self, context: &G, program: ProgramId) -> Result<(), BindingError>
    where
        G: GraphicsContext + ?Sized,
    {
        let attribute_locations: Vec<Option<u32>> = self
            .attributes
            .iter()
            .map(|binding| {
                let location = context.attribute_location(program, &binding.name);
                if location.is_none() {
                    log::warn!("attribute {:?} is inactive in {:?}", binding.name, program);
                }
                location
            })
            .collect();

        let uniform_locations = self
            .uniforms
            .iter()
            .map(|binding| {
                context
                    .uniform_location(program, &binding.name)
                    .ok_or_else(|| BindingError::MissingUniform {
                        name: binding.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.attribute_locations = attribute_locations;
        self.uniform_locations = uniform_locations;
        Ok(())
    }

    /// Binds every active attribute buffer and describes its layout.
    pub fn bind_attributes<G>(&self, context: &mut G)
    where
        G: GraphicsContext + ?Sized,
    {
        for (binding, location) in self.attributes.iter().zip(&self.attribute_locations) {
            let Some(location) = *location else {
                continue;
            };
            context.bind_buffer(BufferTarget::Array, binding.buffer);
            context.vertex_attrib_pointer(location, &binding.layout);
            context.enable_vertex_attrib_array(location);
        }
    }

    /// Evaluates every uniform against `frame` and uploads it, in order.
    pub fn dispatch_uniforms<G>(&self, context: &mut G, frame: &FrameContext<'_>)
    where
        G: GraphicsContext + ?Sized,
    {
        for (binding, location) in self.uniforms.iter().zip(&self.uniform_locations) {
            let value = binding.source.evaluate(frame);
            context.set_uniform(*location, &value);
        }
    }
}
