use std::task::{Context, Poll};

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3, Vector4};
use futures::FutureExt;
use uuid::Uuid;

use crate::error::{BindingError, ConstructionError, SceneError};
use crate::gfx::backend::{
    BufferData, BufferId, BufferTarget, GraphicsContext, ProgramId, TextureId, UsageHint,
};
use crate::gfx::bindings::{
    AttributeBinding, AttributeLayout, BindingTable, FrameContext, UniformSource,
};
use crate::gfx::geometry::GeometryData;
use crate::gfx::shader::{ProgramState, ShaderLoader};

use super::lights::{self, PointLight};
use super::scene::SceneState;
use super::transform::Transform;

/// Unique handle of a primitive within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(Uuid);

impl PrimitiveId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which default bindings a new primitive starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingPreset {
    /// Positions, texture coordinates and normals plus the full lighting
    /// uniform set.
    #[default]
    Lit,
    /// Positions and texture coordinates plus the sampler, for screen-space
    /// quads that ignore the camera.
    Overlay,
}

/// Everything needed to build a [`Primitive`].
#[derive(Debug, Clone)]
pub struct PrimitiveDescriptor {
    pub geometry: GeometryData,
    /// Loader key of the vertex stage
    pub vertex_shader: String,
    /// Loader key of the fragment stage
    pub fragment_shader: String,
    pub texture: Option<TextureId>,
    pub reflectivity: f32,
    pub exponent: i32,
    pub transform: Transform,
    pub preset: BindingPreset,
}

impl PrimitiveDescriptor {
    pub fn new(
        geometry: GeometryData,
        vertex_shader: impl Into<String>,
        fragment_shader: impl Into<String>,
    ) -> Self {
        Self {
            geometry,
            vertex_shader: vertex_shader.into(),
            fragment_shader: fragment_shader.into(),
            texture: None,
            reflectivity: 0.0,
            exponent: 32,
            transform: Transform::default(),
            preset: BindingPreset::Lit,
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_exponent(mut self, exponent: i32) -> Self {
        self.exponent = exponent;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_translation(mut self, translation: Vector3<f32>) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn with_preset(mut self, preset: BindingPreset) -> Self {
        self.preset = preset;
        self
    }
}

/// Screen-space rectangle in normalized device coordinates.
///
/// `(x, y)` is the minimum corner and `(dx, dy)` the maximum one. The all-zero
/// rectangle stands for "nothing visible".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

impl ScreenRect {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn width(&self) -> f32 {
        self.dx - self.x
    }

    pub fn height(&self) -> f32 {
        self.dy - self.y
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x + self.dx) / 2.0, (self.y + self.dy) / 2.0)
    }
}

/// GPU buffers allocated for the primitive's own geometry.
#[derive(Debug, Clone, Copy)]
struct GeometryBuffers {
    positions: BufferId,
    tex_coords: BufferId,
    normals: BufferId,
    indices: BufferId,
}

impl GeometryBuffers {
    fn create<G: GraphicsContext + ?Sized>(context: &mut G) -> Self {
        Self {
            positions: context.create_buffer(BufferTarget::Array),
            tex_coords: context.create_buffer(BufferTarget::Array),
            normals: context.create_buffer(BufferTarget::Array),
            indices: context.create_buffer(BufferTarget::ElementArray),
        }
    }

    fn all(&self) -> [BufferId; 4] {
        [self.positions, self.tex_coords, self.normals, self.indices]
    }
}

/// Validated geometry in the form it is uploaded.
struct CheckedGeometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    indices: Vec<u16>,
}

fn check_geometry(geometry: GeometryData) -> Result<CheckedGeometry, ConstructionError> {
    let points = geometry.positions.len();
    if points > u16::MAX as usize + 1 {
        return Err(ConstructionError::TooManyVertices { points });
    }
    for (triangle, corners) in geometry.triangles.iter().enumerate() {
        if let Some(&index) = corners.iter().find(|&&index| index as usize >= points) {
            return Err(ConstructionError::IndexOutOfRange {
                triangle,
                index,
                points,
            });
        }
    }
    if let Some(normals) = &geometry.normals {
        if normals.len() != points {
            return Err(ConstructionError::NormalCountMismatch {
                points,
                normals: normals.len(),
            });
        }
    }
    if geometry.tex_coords.len() != points {
        return Err(ConstructionError::TexCoordCountMismatch {
            points,
            tex_coords: geometry.tex_coords.len(),
        });
    }

    let normals = geometry.resolved_normals()?;
    // every index is below `points`, which fits in 16 bits
    let indices = geometry
        .triangles
        .iter()
        .flatten()
        .map(|&index| index as u16)
        .collect();

    Ok(CheckedGeometry {
        positions: geometry.positions,
        normals,
        tex_coords: geometry.tex_coords,
        indices,
    })
}

/// A drawable mesh together with its buffers, bindings and shader program.
pub struct Primitive {
    id: PrimitiveId,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    indices: Vec<u16>,
    buffers: GeometryBuffers,

    transform: Transform,
    model: Matrix4<f32>,
    model_view: Matrix4<f32>,
    view: Matrix4<f32>,
    view_point_lights: Vec<PointLight>,

    texture: Option<TextureId>,
    reflectivity: f32,
    exponent: i32,

    bindings: BindingTable,
    program: ProgramState,
}

impl Primitive {
    /// Validates the geometry, uploads it and starts fetching the shaders.
    ///
    /// Nothing is allocated on the context when validation fails. The
    /// primitive stays pending until its program is polled to completion and
    /// sees an identity view until a scene pushes its camera.
    pub fn new<G>(
        descriptor: PrimitiveDescriptor,
        context: &mut G,
        loader: &dyn ShaderLoader,
    ) -> Result<Self, ConstructionError>
    where
        G: GraphicsContext + ?Sized,
    {
        let geometry = check_geometry(descriptor.geometry)?;
        let load = loader.fetch(&descriptor.vertex_shader, &descriptor.fragment_shader);

        let buffers = GeometryBuffers::create(context);
        let bindings = match descriptor.preset {
            BindingPreset::Lit => lit_bindings(&buffers),
            BindingPreset::Overlay => overlay_bindings(&buffers),
        };

        let view = Matrix4::identity();
        let model = descriptor.transform.model_matrix();
        let mut primitive = Self {
            id: PrimitiveId::new(),
            positions: geometry.positions,
            normals: geometry.normals,
            tex_coords: geometry.tex_coords,
            indices: geometry.indices,
            buffers,
            transform: descriptor.transform,
            model,
            model_view: view * model,
            view,
            view_point_lights: Vec::new(),
            texture: descriptor.texture,
            reflectivity: descriptor.reflectivity,
            exponent: descriptor.exponent,
            bindings,
            program: ProgramState::Pending(load),
        };
        primitive.update_buffers(context);

        log::debug!(
            "created primitive {} with {} vertices and {} triangles",
            primitive.id,
            primitive.positions.len(),
            primitive.indices.len() / 3
        );
        Ok(primitive)
    }

    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    pub fn program_state(&self) -> &ProgramState {
        &self.program
    }

    pub fn is_ready(&self) -> bool {
        self.program.is_ready()
    }

    pub fn is_pending(&self) -> bool {
        self.program.is_pending()
    }

    pub fn is_failed(&self) -> bool {
        self.program.is_failed()
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    // Geometry

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Swaps in new geometry and re-uploads every geometry buffer.
    ///
    /// On error the current geometry and its buffers are left untouched.
    pub fn replace_geometry<G>(
        &mut self,
        context: &mut G,
        geometry: GeometryData,
    ) -> Result<(), ConstructionError>
    where
        G: GraphicsContext + ?Sized,
    {
        let geometry = check_geometry(geometry)?;
        self.positions = geometry.positions;
        self.normals = geometry.normals;
        self.tex_coords = geometry.tex_coords;
        self.indices = geometry.indices;
        self.update_buffers(context);
        Ok(())
    }

    /// Re-uploads positions, texture coordinates, normals and indices into the
    /// primitive's own buffers.
    pub fn update_buffers<G>(&mut self, context: &mut G)
    where
        G: GraphicsContext + ?Sized,
    {
        let positions: &[f32] = bytemuck::cast_slice(&self.positions);
        let tex_coords: &[f32] = bytemuck::cast_slice(&self.tex_coords);
        let normals: &[f32] = bytemuck::cast_slice(&self.normals);

        context.upload_buffer(
            BufferTarget::Array,
            self.buffers.positions,
            BufferData::F32(positions),
            UsageHint::StaticDraw,
        );
        context.upload_buffer(
            BufferTarget::Array,
            self.buffers.tex_coords,
            BufferData::F32(tex_coords),
            UsageHint::StaticDraw,
        );
        context.upload_buffer(
            BufferTarget::Array,
            self.buffers.normals,
            BufferData::F32(normals),
            UsageHint::StaticDraw,
        );
        context.upload_buffer(
            BufferTarget::ElementArray,
            self.buffers.indices,
            BufferData::U16(&self.indices),
            UsageHint::StaticDraw,
        );
    }

    // Transform

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.transform.translation
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.transform.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.transform.scale
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.transform.translation = translation;
        self.update_matrices();
    }

    /// Per-axis rotation in radians, applied X then Y then Z.
    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.transform.rotation = rotation;
        self.update_matrices();
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.transform.scale = scale;
        self.update_matrices();
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.update_matrices();
    }

    /// Recomputes the model and model-view matrices from the transform and the
    /// last view pushed by the scene.
    pub fn update_matrices(&mut self) {
        self.model = self.transform.model_matrix();
        self.model_view = self.view * self.model;
    }

    /// Takes a new camera view and the scene's world-space point lights.
    pub(crate) fn update_view(&mut self, view: &Matrix4<f32>, point_lights: &[PointLight]) {
        self.view = *view;
        self.view_point_lights = lights::to_view_space(point_lights, view);
        self.update_matrices();
    }

    pub fn model_matrix(&self) -> &Matrix4<f32> {
        &self.model
    }

    pub fn model_view(&self) -> &Matrix4<f32> {
        &self.model_view
    }

    /// Inverse-transpose of the model-view matrix, identity when singular.
    pub fn normal_matrix(&self) -> Matrix4<f32> {
        self.model_view
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity)
    }

    /// Point lights in this primitive's view space.
    pub fn view_point_lights(&self) -> &[PointLight] {
        &self.view_point_lights
    }

    // Material

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        self.texture = texture;
    }

    pub fn reflectivity(&self) -> f32 {
        self.reflectivity
    }

    pub fn set_reflectivity(&mut self, reflectivity: f32) {
        self.reflectivity = reflectivity;
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    pub fn set_exponent(&mut self, exponent: i32) {
        self.exponent = exponent;
    }

    // Bindings

    /// Appends an attribute fed from an externally owned buffer.
    ///
    /// A ready primitive re-resolves its locations right away. The buffer is
    /// never deleted by the primitive.
    pub fn add_attribute<G>(
        &mut self,
        context: &G,
        name: impl Into<String>,
        buffer: BufferId,
        layout: AttributeLayout,
    ) -> Result<(), BindingError>
    where
        G: GraphicsContext + ?Sized,
    {
        self.bindings
            .push_attribute(AttributeBinding::new(name, buffer, layout));
        if let Err(error) = self.resolve_if_ready(context) {
            self.bindings.pop_attribute();
            return Err(error);
        }
        Ok(())
    }

    /// Appends a uniform binding.
    ///
    /// A ready primitive re-resolves its locations right away. If the program
    /// has no such uniform the binding is dropped again and the error returned.
    pub fn add_uniform<G>(
        &mut self,
        context: &G,
        name: impl Into<String>,
        source: UniformSource,
    ) -> Result<(), BindingError>
    where
        G: GraphicsContext + ?Sized,
    {
        self.bindings.push_uniform(name, source);
        if let Err(error) = self.resolve_if_ready(context) {
            self.bindings.pop_uniform();
            return Err(error);
        }
        Ok(())
    }

    fn resolve_if_ready<G>(&mut self, context: &G) -> Result<(), BindingError>
    where
        G: GraphicsContext + ?Sized,
    {
        match self.program.program() {
            Some(program) => self.bindings.resolve(context, program),
            None => Ok(()),
        }
    }

    // Program lifecycle

    /// Drives a pending shader fetch. Once the sources arrive they are
    /// compiled and the bindings resolved against the new program.
    ///
    /// Any failure leaves the primitive [`ProgramState::Failed`].
    pub fn poll_program<G>(
        &mut self,
        context: &mut G,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), SceneError>>
    where
        G: GraphicsContext + ?Sized,
    {
        let load = match &mut self.program {
            ProgramState::Pending(load) => load,
            ProgramState::Ready(_) => return Poll::Ready(Ok(())),
            ProgramState::Failed => return Poll::Ready(Err(SceneError::PrimitiveFailed(self.id))),
        };
        let fetched = futures::ready!(load.poll_unpin(cx));
        self.program = ProgramState::Failed;

        let result = match fetched {
            Ok(sources) => match context.compile_program(&sources.vertex, &sources.fragment) {
                Ok(program) => self.attach_program(context, program).map_err(SceneError::from),
                Err(error) => Err(error.into()),
            },
            Err(error) => Err(error.into()),
        };
        if let Err(error) = &result {
            log::error!("primitive {} failed to load its program: {}", self.id, error);
        }
        Poll::Ready(result)
    }

    /// Resolves every binding against a freshly linked `program` and makes
    /// the primitive ready.
    ///
    /// On failure the program is deleted and the primitive marked failed.
    fn attach_program<G>(
        &mut self,
        context: &mut G,
        program: ProgramId,
    ) -> Result<(), BindingError>
    where
        G: GraphicsContext + ?Sized,
    {
        if let Err(error) = self.bindings.resolve(&*context, program) {
            context.delete_program(program);
            self.program = ProgramState::Failed;
            return Err(error);
        }
        self.program = ProgramState::Ready(program);
        self.update_matrices();
        log::debug!("primitive {} is ready with {:?}", self.id, program);
        Ok(())
    }

    // Rendering

    /// Issues this primitive's draw call. Does nothing unless ready.
    pub fn draw<G>(&self, context: &mut G, scene: &SceneState)
    where
        G: GraphicsContext + ?Sized,
    {
        let Some(program) = self.program.program() else {
            return;
        };
        log::trace!("drawing primitive {} with {:?}", self.id, program);

        context.use_program(program);
        self.bindings.bind_attributes(context);
        context.bind_texture(0, self.texture);

        let frame = FrameContext {
            primitive: self,
            scene,
        };
        self.bindings.dispatch_uniforms(context, &frame);

        context.bind_buffer(BufferTarget::ElementArray, self.buffers.indices);
        context.draw_elements(
            wgpu::PrimitiveTopology::TriangleList,
            self.index_count(),
            wgpu::IndexFormat::Uint16,
            0,
        );
    }

    /// Screen-space extent of the vertices in front of the camera.
    ///
    /// Vertices with a non-positive clip `w` are skipped. When none remain the
    /// empty rectangle is returned.
    pub fn bounding_box(&self, projection: &Matrix4<f32>) -> ScreenRect {
        let mut bounds: Option<ScreenRect> = None;
        for position in &self.positions {
            let eye = self.model_view * Vector4::new(position[0], position[1], position[2], 1.0);
            let clip = projection * eye;
            if clip.w <= 0.0 {
                continue;
            }
            let (x, y) = (clip.x / clip.w, clip.y / clip.w);
            bounds = Some(match bounds {
                None => ScreenRect { x, y, dx: x, dy: y },
                Some(rect) => ScreenRect {
                    x: rect.x.min(x),
                    y: rect.y.min(y),
                    dx: rect.dx.max(x),
                    dy: rect.dy.max(y),
                },
            });
        }
        bounds.unwrap_or_default()
    }

    /// Deletes the primitive's own buffers and its program.
    ///
    /// Buffers supplied through [`add_attribute`](Self::add_attribute) belong
    /// to the caller and are left alone.
    pub fn release<G>(self, context: &mut G)
    where
        G: GraphicsContext + ?Sized,
    {
        for buffer in self.buffers.all() {
            context.delete_buffer(buffer);
        }
        if let Some(program) = self.program.program() {
            context.delete_program(program);
        }
        log::debug!("released primitive {}", self.id);
    }
}

impl std::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive")
            .field("id", &self.id)
            .field("vertices", &self.positions.len())
            .field("indices", &self.indices.len())
            .field("transform", &self.transform)
            .field("program", &self.program)
            .finish()
    }
}

fn lit_bindings(buffers: &GeometryBuffers) -> BindingTable {
    let mut table = BindingTable::new();
    table.push_attribute(AttributeBinding::new(
        "aVertexPosition",
        buffers.positions,
        AttributeLayout::floats(3),
    ));
    table.push_attribute(AttributeBinding::new(
        "aTextureCoord",
        buffers.tex_coords,
        AttributeLayout::floats(2),
    ));
    table.push_attribute(AttributeBinding::new(
        "aVertexNormal",
        buffers.normals,
        AttributeLayout::floats(3),
    ));

    table.push_uniform(
        "uProjectionMatrix",
        UniformSource::mat4(|frame| *frame.scene.projection()),
    );
    table.push_uniform(
        "uModelViewMatrix",
        UniformSource::mat4(|frame| *frame.primitive.model_view()),
    );
    table.push_uniform("uSampler", UniformSource::constant_int(0));
    table.push_uniform(
        "uNormalMatrix",
        UniformSource::mat4(|frame| frame.primitive.normal_matrix()),
    );
    table.push_uniform(
        "uAmbiantLight",
        UniformSource::vec3(|frame| frame.scene.ambient_light()),
    );
    table.push_uniform(
        "uDirectionalLightsColor",
        UniformSource::vec3_array(|frame| {
            lights::pack_directional_colors(frame.scene.directional_lights())
        }),
    );
    table.push_uniform(
        "uDirectionalsVector",
        UniformSource::vec3_array(|frame| {
            lights::pack_directional_vectors(frame.scene.directional_lights())
        }),
    );
    table.push_uniform(
        "uViewRotationMatrix",
        UniformSource::mat4(|frame| *frame.scene.view_rotation()),
    );
    table.push_uniform(
        "uPointLightsPositions",
        UniformSource::vec3_array(|frame| {
            lights::pack_point_positions(frame.primitive.view_point_lights())
        }),
    );
    table.push_uniform(
        "uPointLightsColor",
        UniformSource::vec3_array(|frame| lights::pack_point_colors(frame.scene.point_lights())),
    );
    table.push_uniform(
        "uReflectivity",
        UniformSource::float(|frame| frame.primitive.reflectivity()),
    );
    table.push_uniform(
        "uExponant",
        UniformSource::int(|frame| frame.primitive.exponent()),
    );
    table
}

fn overlay_bindings(buffers: &GeometryBuffers) -> BindingTable {
    let mut table = BindingTable::new();
    table.push_attribute(AttributeBinding::new(
        "aVertexPosition",
        buffers.positions,
        AttributeLayout::floats(3),
    ));
    table.push_attribute(AttributeBinding::new(
        "aTextureCoord",
        buffers.tex_coords,
        AttributeLayout::floats(2),
    ));
    table.push_uniform("uSampler", UniformSource::constant_int(0));
    table
}
