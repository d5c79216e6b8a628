use std::collections::HashMap;
use std::task::{Context, Poll};

use cgmath::{Deg, Matrix4, Rad, Vector3};

use crate::error::{Result, SceneError};
use crate::gfx::backend::{BufferId, Capability, ClearMask, GraphicsContext};
use crate::gfx::bindings::{AttributeLayout, UniformSource};
use crate::gfx::camera::PerspectiveCamera;
use crate::gfx::geometry::GeometryData;
use crate::gfx::shader::ShaderLoader;

use super::lights::{AmbientLight, DirectionalLight, LightSet, PointLight};
use super::object::{Primitive, PrimitiveDescriptor, PrimitiveId, ScreenRect};

/// A GPU state change run once per frame before any primitive is drawn.
pub type PreRenderInstruction<G> = Box<dyn Fn(&mut G)>;

/// Camera and lights, the scene state uniform producers read from.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    camera: PerspectiveCamera,
    lights: LightSet,
}

impl SceneState {
    pub fn new(camera: PerspectiveCamera, lights: LightSet) -> Self {
        Self { camera, lights }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        self.camera.projection()
    }

    pub fn view(&self) -> &Matrix4<f32> {
        self.camera.view()
    }

    pub fn view_rotation(&self) -> &Matrix4<f32> {
        self.camera.view_rotation()
    }

    pub fn ambient_light(&self) -> AmbientLight {
        self.lights.ambient
    }

    pub fn directional_lights(&self) -> &[DirectionalLight] {
        self.lights.directional()
    }

    /// Point lights in world space.
    pub fn point_lights(&self) -> &[PointLight] {
        self.lights.point()
    }
}

/// Scene configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub fov: Rad<f32>,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub camera_rotation: Vector3<f32>,
    pub camera_translation: Vector3<f32>,
    pub ambient_light: AmbientLight,
    /// Colour the default pre-render instructions clear to
    pub clear_color: wgpu::Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov: Deg(45.0f32).into(),
            near: 0.1,
            far: 100.0,
            aspect: 1.0,
            camera_rotation: Vector3::new(0.0, 0.0, 0.0),
            camera_translation: Vector3::new(0.0, 0.0, 0.0),
            ambient_light: [0.2, 0.2, 0.2],
            clear_color: wgpu::Color::BLACK,
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fov(mut self, fov: impl Into<Rad<f32>>) -> Self {
        self.fov = fov.into();
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_camera_rotation(mut self, rotation: Vector3<f32>) -> Self {
        self.camera_rotation = rotation;
        self
    }

    pub fn with_camera_translation(mut self, translation: Vector3<f32>) -> Self {
        self.camera_translation = translation;
        self
    }

    pub fn with_ambient_light(mut self, ambient: AmbientLight) -> Self {
        self.ambient_light = ambient;
        self
    }

    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }
}

/// A primitive whose shader program could not be loaded.
#[derive(Debug)]
pub struct ShaderFailure {
    pub id: PrimitiveId,
    pub error: SceneError,
}

/// The default frame setup: depth testing, alpha blending, and a clear.
pub fn default_pre_render_instructions<G>(
    clear_color: wgpu::Color,
) -> Vec<PreRenderInstruction<G>>
where
    G: GraphicsContext + 'static,
{
    let setup: PreRenderInstruction<G> = Box::new(move |context: &mut G| {
        context.clear_color(clear_color);
        context.clear_depth(1.0);
        context.enable(Capability::DepthTest);
        context.depth_func(wgpu::CompareFunction::LessEqual);
        context.enable(Capability::Blend);
        context.disable(Capability::CullFace);
    });
    let blend_and_clear: PreRenderInstruction<G> = Box::new(|context: &mut G| {
        context.blend_func(
            wgpu::BlendFactor::SrcAlpha,
            wgpu::BlendFactor::OneMinusSrcAlpha,
        );
        context.clear(ClearMask::COLOR_AND_DEPTH);
    });
    vec![setup, blend_and_clear]
}

/// Owns the graphics context, the camera and lights, and every primitive.
///
/// Every camera or light change is pushed to all primitives before the setter
/// returns, so no stale matrix can be drawn.
pub struct Scene<G: GraphicsContext> {
    context: G,
    state: SceneState,
    primitives: HashMap<PrimitiveId, Primitive>,
    pre_render: Vec<PreRenderInstruction<G>>,
}

impl<G: GraphicsContext + 'static> Scene<G> {
    pub fn new(context: G, config: SceneConfig) -> Self {
        let camera = PerspectiveCamera::new(
            config.fov,
            config.aspect,
            config.near,
            config.far,
            config.camera_rotation,
            config.camera_translation,
        );
        log::debug!(
            "new scene: fov {:?}, clip {}..{}, aspect {}",
            config.fov,
            config.near,
            config.far,
            config.aspect
        );

        Self {
            context,
            state: SceneState::new(camera, LightSet::new(config.ambient_light)),
            primitives: HashMap::new(),
            pre_render: default_pre_render_instructions(config.clear_color),
        }
    }

    pub fn context(&self) -> &G {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut G {
        &mut self.context
    }

    /// Consumes the scene, releasing every primitive, and hands back the context.
    pub fn into_context(mut self) -> G {
        for (_, primitive) in self.primitives.drain() {
            primitive.release(&mut self.context);
        }
        self.context
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    // Camera

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.state.camera
    }

    pub fn fov(&self) -> Rad<f32> {
        self.state.camera.fov()
    }

    pub fn set_fov(&mut self, fov: impl Into<Rad<f32>>) {
        self.state.camera.set_fov(fov);
        self.broadcast_view();
    }

    pub fn near(&self) -> f32 {
        self.state.camera.near()
    }

    pub fn set_near(&mut self, near: f32) {
        self.state.camera.set_near(near);
        self.broadcast_view();
    }

    pub fn far(&self) -> f32 {
        self.state.camera.far()
    }

    pub fn set_far(&mut self, far: f32) {
        self.state.camera.set_far(far);
        self.broadcast_view();
    }

    pub fn aspect(&self) -> f32 {
        self.state.camera.aspect()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.state.camera.set_aspect(aspect);
        self.broadcast_view();
    }

    pub fn camera_rotation(&self) -> Vector3<f32> {
        self.state.camera.rotation()
    }

    pub fn set_camera_rotation(&mut self, rotation: Vector3<f32>) {
        self.state.camera.set_rotation(rotation);
        self.broadcast_view();
    }

    pub fn camera_translation(&self) -> Vector3<f32> {
        self.state.camera.translation()
    }

    pub fn set_camera_translation(&mut self, translation: Vector3<f32>) {
        self.state.camera.set_translation(translation);
        self.broadcast_view();
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        self.state.projection()
    }

    pub fn view(&self) -> &Matrix4<f32> {
        self.state.view()
    }

    pub fn view_rotation(&self) -> &Matrix4<f32> {
        self.state.view_rotation()
    }

    // Lights

    pub fn ambient_light(&self) -> AmbientLight {
        self.state.lights.ambient
    }

    pub fn set_ambient_light(&mut self, ambient: AmbientLight) {
        self.state.lights.ambient = ambient;
    }

    pub fn directional_lights(&self) -> &[DirectionalLight] {
        self.state.lights.directional()
    }

    pub fn point_lights(&self) -> &[PointLight] {
        self.state.lights.point()
    }

    pub fn add_directional_light(&mut self, light: DirectionalLight) -> Result<()> {
        self.state.lights.add_directional(light)?;
        Ok(())
    }

    /// Adds a world-space point light and re-expresses the point lights in
    /// every primitive's view space.
    pub fn add_point_light(&mut self, light: PointLight) -> Result<()> {
        self.state.lights.add_point(light)?;
        self.broadcast_view();
        Ok(())
    }

    /// Removes every directional and point light. Ambient light is kept.
    pub fn clear_lights(&mut self) {
        self.state.lights.clear();
        self.broadcast_view();
    }

    fn broadcast_view(&mut self) {
        let view = *self.state.camera.view();
        let point_lights = self.state.lights.point();
        for primitive in self.primitives.values_mut() {
            primitive.update_view(&view, point_lights);
        }
    }

    // Primitives

    /// Builds a primitive and registers it. Its shaders are fetched through
    /// `loader` and compiled once [`poll_shaders`](Self::poll_shaders) or
    /// [`finish_loading`](Self::finish_loading) drives the load.
    pub fn spawn(
        &mut self,
        descriptor: PrimitiveDescriptor,
        loader: &dyn ShaderLoader,
    ) -> Result<PrimitiveId> {
        let mut primitive = Primitive::new(descriptor, &mut self.context, loader)?;
        primitive.update_view(self.state.view(), self.state.point_lights());

        let id = primitive.id();
        self.primitives.insert(id, primitive);
        Ok(id)
    }

    /// Deregisters a primitive and releases its buffers and program.
    pub fn remove(&mut self, id: PrimitiveId) -> Result<()> {
        let primitive = self
            .primitives
            .remove(&id)
            .ok_or(SceneError::UnknownPrimitive(id))?;
        primitive.release(&mut self.context);
        Ok(())
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.get_mut(&id)
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.values()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Appends a custom attribute to a primitive. `buffer` stays owned by the
    /// caller.
    pub fn add_attribute(
        &mut self,
        id: PrimitiveId,
        name: impl Into<String>,
        buffer: BufferId,
        layout: AttributeLayout,
    ) -> Result<()> {
        let primitive = self
            .primitives
            .get_mut(&id)
            .ok_or(SceneError::UnknownPrimitive(id))?;
        primitive.add_attribute(&self.context, name, buffer, layout)?;
        Ok(())
    }

    /// Appends a uniform binding to a primitive.
    pub fn add_uniform(
        &mut self,
        id: PrimitiveId,
        name: impl Into<String>,
        source: UniformSource,
    ) -> Result<()> {
        let primitive = self
            .primitives
            .get_mut(&id)
            .ok_or(SceneError::UnknownPrimitive(id))?;
        primitive.add_uniform(&self.context, name, source)?;
        Ok(())
    }

    /// Replaces a primitive's geometry and re-uploads its buffers.
    pub fn replace_geometry(&mut self, id: PrimitiveId, geometry: GeometryData) -> Result<()> {
        let primitive = self
            .primitives
            .get_mut(&id)
            .ok_or(SceneError::UnknownPrimitive(id))?;
        primitive.replace_geometry(&mut self.context, geometry)?;
        Ok(())
    }

    /// Re-uploads a primitive's geometry buffers.
    pub fn update_buffers(&mut self, id: PrimitiveId) -> Result<()> {
        let primitive = self
            .primitives
            .get_mut(&id)
            .ok_or(SceneError::UnknownPrimitive(id))?;
        primitive.update_buffers(&mut self.context);
        Ok(())
    }

    // Shader loading

    /// Makes progress on every pending shader load without blocking.
    ///
    /// Returns the primitives whose load failed during this call. They stay
    /// registered but never draw.
    pub fn poll_shaders(&mut self) -> Vec<ShaderFailure> {
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        let mut failures = Vec::new();

        for (id, primitive) in self.primitives.iter_mut() {
            if !primitive.is_pending() {
                continue;
            }
            if let Poll::Ready(Err(error)) = primitive.poll_program(&mut self.context, &mut cx) {
                failures.push(ShaderFailure { id: *id, error });
            }
        }
        failures
    }

    /// Blocks until the primitive's program is ready or has failed.
    pub fn finish_loading(&mut self, id: PrimitiveId) -> Result<()> {
        let primitive = self
            .primitives
            .get_mut(&id)
            .ok_or(SceneError::UnknownPrimitive(id))?;
        let context = &mut self.context;
        pollster::block_on(futures::future::poll_fn(|cx| {
            primitive.poll_program(&mut *context, cx)
        }))
    }

    /// Blocks until every pending load has settled.
    pub fn finish_all(&mut self) -> Vec<ShaderFailure> {
        let pending: Vec<PrimitiveId> = self
            .primitives
            .iter()
            .filter(|(_, primitive)| primitive.is_pending())
            .map(|(id, _)| *id)
            .collect();

        pending
            .into_iter()
            .filter_map(|id| {
                self.finish_loading(id)
                    .err()
                    .map(|error| ShaderFailure { id, error })
            })
            .collect()
    }

    // Rendering

    /// Appends a GPU state instruction to the per-frame setup.
    pub fn add_pre_render_instruction(
        &mut self,
        instruction: impl Fn(&mut G) + 'static,
    ) -> &mut Self {
        self.pre_render.push(Box::new(instruction));
        self
    }

    /// Drops every pre-render instruction, including the defaults.
    pub fn clear_pre_render_instructions(&mut self) {
        self.pre_render.clear();
    }

    /// Runs the pre-render instructions, then draws every primitive.
    ///
    /// Primitives that are not ready are skipped. No culling or sorting.
    pub fn render(&mut self) {
        for instruction in &self.pre_render {
            instruction(&mut self.context);
        }
        for primitive in self.primitives.values() {
            primitive.draw(&mut self.context, &self.state);
        }
    }

    /// Screen-space bounds of a primitive under the current projection.
    pub fn bounding_box(&self, id: PrimitiveId) -> Result<ScreenRect> {
        let primitive = self
            .primitives
            .get(&id)
            .ok_or(SceneError::UnknownPrimitive(id))?;
        Ok(primitive.bounding_box(self.state.projection()))
    }
}

impl<G: GraphicsContext + std::fmt::Debug> std::fmt::Debug for Scene<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("context", &self.context)
            .field("state", &self.state)
            .field("primitives", &self.primitives.len())
            .field("pre_render", &self.pre_render.len())
            .finish()
    }
}
