//! # Glint Headless Demo
//!
//! Builds a small lit scene against the recording backend, orbits the camera
//! for a few frames and reports what each frame would have sent to the GPU.
//!
//! ## Usage:
//! ```bash
//! RUST_LOG=debug cargo run --bin glint-demo
//! ```

use std::f32::consts::TAU;

use anyhow::Context as _;
use glint::prelude::*;

const FRAMES: usize = 8;
const VIEWPORT: (f32, f32) = (800.0, 600.0);

fn bundled_shaders() -> StaticShaderLoader {
    StaticShaderLoader::new()
        .with_source("lit.vert", include_str!("../shaders/lit.vert"))
        .with_source("lit.frag", include_str!("../shaders/lit.frag"))
        .with_source("overlay.vert", include_str!("../shaders/overlay.vert"))
        .with_source("overlay.frag", include_str!("../shaders/overlay.frag"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let loader = bundled_shaders();
    let mut context = RecordingContext::new();
    let texture = context.create_texture();

    let config = SceneConfig::new()
        .with_fov(Deg(45.0f32))
        .with_aspect(VIEWPORT.0 / VIEWPORT.1)
        .with_ambient_light([0.15, 0.15, 0.2]);
    let mut scene = Scene::new(context, config);

    scene.add_directional_light(DirectionalLight::new(
        Vector3::new(-0.5, -1.0, -0.3),
        [0.8, 0.8, 0.7],
    ))?;
    scene.add_point_light(PointLight::new(Vector3::new(2.0, 3.0, -2.0), [1.0, 0.6, 0.3]))?;

    let cube_id = scene.spawn(
        PrimitiveDescriptor::new(cube(), "lit.vert", "lit.frag")
            .with_translation(Vector3::new(-1.5, 0.0, -6.0))
            .with_texture(texture)
            .with_reflectivity(0.4),
        &loader,
    )?;
    let ico_id = scene.spawn(
        PrimitiveDescriptor::new(icosahedron(), "lit.vert", "lit.frag")
            .with_translation(Vector3::new(1.5, 0.0, -6.0))
            .with_texture(texture)
            .with_exponent(64),
        &loader,
    )?;
    let quad_id = scene.spawn(
        PrimitiveDescriptor::new(
            ui_quad(16.0, 16.0, 144.0, 80.0, VIEWPORT),
            "overlay.vert",
            "overlay.frag",
        )
        .with_texture(texture)
        .with_preset(BindingPreset::Overlay),
        &loader,
    )?;

    let failures = scene.finish_all();
    if let Some(failure) = failures.first() {
        anyhow::bail!("primitive {} failed to load: {}", failure.id, failure.error);
    }
    log::info!("{} primitives ready", scene.len());
    let setup = scene.context_mut().take_commands();
    log::debug!("{} setup commands recorded", setup.len());

    for frame in 0..FRAMES {
        let angle = TAU * frame as f32 / FRAMES as f32;
        scene.set_camera_rotation(Vector3::new(0.0, angle * 0.1, 0.0));

        if let Some(cube) = scene.get_mut(cube_id) {
            cube.set_rotation(Vector3::new(angle, angle * 0.5, 0.0));
        }

        scene.render();

        let draws = scene.context().draw_calls();
        let commands = scene.context_mut().take_commands().len();
        let cube_box = scene.bounding_box(cube_id)?;
        let ico_box = scene.bounding_box(ico_id)?;
        log::info!(
            "frame {}: {} commands, {} draws, cube {:?}, icosahedron {:?}",
            frame,
            commands,
            draws,
            cube_box,
            ico_box
        );
    }

    scene
        .remove(quad_id)
        .context("removing the overlay quad")?;
    let context = scene.into_context();
    log::info!(
        "shut down with {} live buffers and {} live programs",
        context.live_buffers(),
        context.live_programs()
    );

    Ok(())
}
