//! Binding Table Integration Tests
//!
//! Tests for:
//! - Appending attributes and uniforms after a primitive is ready
//! - Location re-resolution staying index-aligned with the binding lists
//! - Rollback when an appended uniform does not exist in the program
//! - Externally supplied attribute buffers
//! - Geometry replacement keeping appended bindings

use glint::error::{BindingError, ConstructionError};
use glint::gfx::backend::{
    BufferData, BufferTarget, GpuCommand, GraphicsContext, RecordingContext, UniformLocation,
    UsageHint,
};
use glint::gfx::bindings::{AttributeLayout, DataType, UniformKind, UniformSource, UniformValue};
use glint::gfx::geometry::{cube, plane};
use glint::gfx::scene::{BindingPreset, PrimitiveDescriptor, PrimitiveId, Scene, SceneConfig};
use glint::gfx::shader::StaticShaderLoader;
use glint::SceneError;

// uTime is declared in the vertex stage, so it gets location 0 and the
// sampler from the fragment stage location 1.
const TINTED_VERT: &str = "
attribute vec3 aVertexPosition;
attribute vec2 aTextureCoord;
attribute vec4 aColor;
uniform float uTime;
varying vec4 vColor;
void main() {
    vColor = aColor * uTime;
    gl_Position = vec4(aVertexPosition, 1.0);
}
";

const TINTED_FRAG: &str = "
precision mediump float;
uniform sampler2D uSampler;
varying vec4 vColor;
void main() {
    gl_FragColor = vColor;
}
";

fn ready_overlay() -> (Scene<RecordingContext>, PrimitiveId) {
    let loader = StaticShaderLoader::new()
        .with_source("tinted.vert", TINTED_VERT)
        .with_source("tinted.frag", TINTED_FRAG);
    let mut scene = Scene::new(RecordingContext::new(), SceneConfig::default());
    let id = scene
        .spawn(
            PrimitiveDescriptor::new(plane(), "tinted.vert", "tinted.frag")
                .with_preset(BindingPreset::Overlay),
            &loader,
        )
        .unwrap();
    scene.finish_loading(id).unwrap();
    (scene, id)
}

#[test]
fn binding_initial_locations_follow_the_program() {
    let (scene, id) = ready_overlay();
    let bindings = scene.get(id).unwrap().bindings();

    assert_eq!(
        bindings.attribute_names().collect::<Vec<_>>(),
        ["aVertexPosition", "aTextureCoord"]
    );
    assert_eq!(bindings.attribute_locations(), &[Some(0), Some(1)]);
    assert_eq!(bindings.uniform_locations(), &[UniformLocation(1)]);
}

#[test]
fn binding_append_after_ready_re_resolves_everything() {
    let (mut scene, id) = ready_overlay();

    let colors = [1.0f32, 0.5, 0.25, 1.0].repeat(4);
    let buffer = scene.context_mut().create_buffer(BufferTarget::Array);
    scene.context_mut().upload_buffer(
        BufferTarget::Array,
        buffer,
        BufferData::F32(&colors),
        UsageHint::DynamicDraw,
    );
    let uploaded = scene.context().buffer_contents(buffer).unwrap().to_vec();

    scene
        .add_attribute(id, "aColor", buffer, AttributeLayout::floats(4))
        .unwrap();
    scene
        .add_uniform(id, "uTime", UniformSource::float(|_| 0.5))
        .unwrap();

    let bindings = scene.get(id).unwrap().bindings();
    assert!(bindings.is_resolved());
    assert_eq!(bindings.attribute_locations(), &[Some(0), Some(1), Some(2)]);
    assert_eq!(
        bindings.uniform_locations(),
        &[UniformLocation(1), UniformLocation(0)]
    );
    assert_eq!(
        bindings.uniform_names().collect::<Vec<_>>(),
        ["uSampler", "uTime"]
    );

    // the caller's buffer is bound as-is, never re-uploaded
    assert_eq!(scene.context().buffer_contents(buffer).unwrap(), &uploaded[..]);

    scene.context_mut().clear_commands();
    scene.render();
    let commands = scene.context().commands();
    assert!(commands.contains(&GpuCommand::BindBuffer {
        target: BufferTarget::Array,
        buffer,
    }));
    assert!(commands.contains(&GpuCommand::EnableVertexAttribArray(2)));
    assert!(commands.contains(&GpuCommand::SetUniform {
        location: UniformLocation(0),
        value: UniformValue::Float(0.5),
    }));
}

#[test]
fn binding_missing_uniform_rolls_back() {
    let (mut scene, id) = ready_overlay();
    scene
        .add_uniform(id, "uTime", UniformSource::float(|_| 1.0))
        .unwrap();

    let result = scene.add_uniform(id, "uMissing", UniformSource::constant_int(3));
    match result {
        Err(SceneError::Binding(BindingError::MissingUniform { name })) => {
            assert_eq!(name, "uMissing")
        }
        other => panic!("expected a missing uniform error, got {:?}", other),
    }

    // the primitive keeps drawing with its previous, consistent table
    let primitive = scene.get(id).unwrap();
    assert!(primitive.is_ready());
    assert!(primitive.bindings().is_resolved());
    assert_eq!(primitive.bindings().uniforms().len(), 2);
    assert_eq!(
        primitive.bindings().uniform_locations(),
        &[UniformLocation(1), UniformLocation(0)]
    );
}

#[test]
fn binding_inactive_attribute_is_skipped() {
    let (mut scene, id) = ready_overlay();
    let buffer = scene.context_mut().create_buffer(BufferTarget::Array);
    scene
        .add_attribute(
            id,
            "aUnused",
            buffer,
            AttributeLayout::floats(1).with_data_type(DataType::UnsignedByte).with_normalized(true),
        )
        .unwrap();

    let bindings = scene.get(id).unwrap().bindings();
    assert_eq!(bindings.attribute_locations().last(), Some(&None));

    scene.context_mut().clear_commands();
    scene.render();
    assert!(!scene.context().commands().contains(&GpuCommand::BindBuffer {
        target: BufferTarget::Array,
        buffer,
    }));
    assert_eq!(scene.context().draw_calls(), 1);
}

#[test]
fn binding_append_before_ready_resolves_on_load() {
    let loader = StaticShaderLoader::new()
        .with_source("tinted.vert", TINTED_VERT)
        .with_source("tinted.frag", TINTED_FRAG);
    let mut scene = Scene::new(RecordingContext::new(), SceneConfig::default());
    let id = scene
        .spawn(
            PrimitiveDescriptor::new(plane(), "tinted.vert", "tinted.frag")
                .with_preset(BindingPreset::Overlay),
            &loader,
        )
        .unwrap();

    // no program yet, the new uniform is resolved once loading finishes
    scene
        .add_uniform(id, "uTime", UniformSource::float(|_| 2.0))
        .unwrap();
    assert!(!scene.get(id).unwrap().bindings().is_resolved());

    scene.finish_loading(id).unwrap();
    let bindings = scene.get(id).unwrap().bindings();
    assert!(bindings.is_resolved());
    assert_eq!(
        bindings.uniforms().iter().map(|u| u.source.kind()).collect::<Vec<_>>(),
        [UniformKind::Int, UniformKind::Float]
    );
}

#[test]
fn binding_unknown_primitive_is_reported() {
    let (mut scene, id) = ready_overlay();
    scene.remove(id).unwrap();
    let result = scene.add_uniform(id, "uTime", UniformSource::float(|_| 0.0));
    assert!(matches!(result, Err(SceneError::UnknownPrimitive(missing)) if missing == id));
}

#[test]
fn binding_replace_geometry_rebuilds_owned_buffers() {
    let (mut scene, id) = ready_overlay();
    let colors = scene.context_mut().create_buffer(BufferTarget::Array);
    scene
        .add_attribute(id, "aColor", colors, AttributeLayout::floats(4))
        .unwrap();
    scene
        .add_uniform(id, "uTime", UniformSource::float(|_| 0.25))
        .unwrap();
    let before = scene.get(id).unwrap().bindings().attributes().to_vec();

    scene.context_mut().clear_commands();
    scene.replace_geometry(id, cube()).unwrap();

    // positions, texture coordinates, normals and indices, in place
    let uploads: Vec<_> = scene
        .context()
        .commands()
        .iter()
        .map(|command| match command {
            GpuCommand::UploadBuffer {
                target,
                buffer,
                bytes,
                ..
            } => (*target, *buffer, *bytes),
            other => panic!("unexpected command {:?}", other),
        })
        .collect();
    assert_eq!(uploads.len(), 4);
    assert_eq!(uploads[0], (BufferTarget::Array, before[0].buffer, 24 * 3 * 4));
    assert_eq!(uploads[1], (BufferTarget::Array, before[1].buffer, 24 * 2 * 4));
    assert_eq!(uploads[2].2, 24 * 3 * 4);
    assert_eq!(uploads[3].0, BufferTarget::ElementArray);
    assert_eq!(uploads[3].2, 36 * 2);
    for (_, buffer, bytes) in &uploads {
        assert_eq!(scene.context().buffer_contents(*buffer).map(<[u8]>::len), Some(*bytes));
    }

    let primitive = scene.get(id).unwrap();
    assert_eq!(primitive.index_count(), 36);
    assert_eq!(primitive.positions(), &cube().positions[..]);
    assert_eq!(primitive.bindings().attributes(), &before[..]);
    assert_eq!(
        primitive.bindings().uniform_names().collect::<Vec<_>>(),
        ["uSampler", "uTime"]
    );
    assert!(primitive.bindings().is_resolved());

    scene.context_mut().clear_commands();
    scene.render();
    let commands = scene.context().commands();
    assert!(commands.contains(&GpuCommand::BindBuffer {
        target: BufferTarget::Array,
        buffer: colors,
    }));
    assert!(commands.contains(&GpuCommand::SetUniform {
        location: UniformLocation(0),
        value: UniformValue::Float(0.25),
    }));
    assert!(commands.iter().any(|command| matches!(
        command,
        GpuCommand::DrawElements { count: 36, .. }
    )));
}

#[test]
fn binding_rejected_geometry_keeps_current_buffers() {
    let (mut scene, id) = ready_overlay();
    let positions_buffer = scene.get(id).unwrap().bindings().attributes()[0].buffer;
    let uploaded = scene
        .context()
        .buffer_contents(positions_buffer)
        .unwrap()
        .to_vec();

    let mut geometry = cube();
    geometry.tex_coords.truncate(3);

    scene.context_mut().clear_commands();
    let result = scene.replace_geometry(id, geometry);
    match result {
        Err(SceneError::Construction(ConstructionError::TexCoordCountMismatch {
            points,
            tex_coords,
        })) => {
            assert_eq!(points, 24);
            assert_eq!(tex_coords, 3);
        }
        other => panic!("expected a texture coordinate error, got {:?}", other),
    }
    assert!(scene.context().commands().is_empty());

    let primitive = scene.get(id).unwrap();
    assert_eq!(primitive.positions(), &plane().positions[..]);
    assert_eq!(primitive.index_count(), 6);
    assert_eq!(
        scene.context().buffer_contents(positions_buffer).unwrap(),
        &uploaded[..]
    );

    scene.render();
    assert_eq!(scene.context().draw_calls(), 1);
    assert!(scene.context().commands().iter().any(|command| matches!(
        command,
        GpuCommand::DrawElements { count: 6, .. }
    )));
}
