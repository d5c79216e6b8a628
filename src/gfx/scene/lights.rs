//! # Lights
//!
//! Scene light lists and the packing of those lists into the fixed-length
//! flat arrays the shaders declare (`vec3 uPointLightsColor[64]` and friends).
//!
//! Each list holds at most [`MAX_LIGHTS`] entries. The scene refuses to grow a
//! list past that, and the packers truncate anything longer, so a packed array
//! is always exactly [`PACKED_LIGHTS_LEN`] floats with zeros after the last
//! supplied light.

use cgmath::{Matrix4, Vector3};

use crate::error::{LightError, LightKind};

/// Capacity of each light array in the shaders.
pub const MAX_LIGHTS: usize = 64;

/// Length of a packed light array: one RGB or XYZ triple per light.
pub const PACKED_LIGHTS_LEN: usize = MAX_LIGHTS * 3;

/// RGB ambient term.
pub type AmbientLight = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub color: [f32; 3],
}

impl DirectionalLight {
    pub fn new(direction: Vector3<f32>, color: [f32; 3]) -> Self {
        Self { direction, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
}

impl PointLight {
    pub fn new(position: Vector3<f32>, color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// All light sources of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSet {
    pub ambient: AmbientLight,
    directional: Vec<DirectionalLight>,
    point: Vec<PointLight>,
}

impl Default for LightSet {
    fn default() -> Self {
        Self::new([0.2, 0.2, 0.2])
    }
}

impl LightSet {
    pub fn new(ambient: AmbientLight) -> Self {
        Self {
            ambient,
            directional: Vec::new(),
            point: Vec::new(),
        }
    }

    pub fn directional(&self) -> &[DirectionalLight] {
        &self.directional
    }

    pub fn point(&self) -> &[PointLight] {
        &self.point
    }

    pub fn add_directional(&mut self, light: DirectionalLight) -> Result<(), LightError> {
        if self.directional.len() >= MAX_LIGHTS {
            return Err(LightError::CapacityExceeded {
                kind: LightKind::Directional,
                capacity: MAX_LIGHTS,
            });
        }
        self.directional.push(light);
        Ok(())
    }

    pub fn add_point(&mut self, light: PointLight) -> Result<(), LightError> {
        if self.point.len() >= MAX_LIGHTS {
            return Err(LightError::CapacityExceeded {
                kind: LightKind::Point,
                capacity: MAX_LIGHTS,
            });
        }
        self.point.push(light);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
    }
}

/// Packs triples into a zero-padded array of [`PACKED_LIGHTS_LEN`] floats.
///
/// Triples past [`MAX_LIGHTS`] are dropped.
pub fn pack_triples<I>(triples: I) -> Vec<f32>
where
    I: IntoIterator<Item = [f32; 3]>,
{
    let mut packed = Vec::with_capacity(PACKED_LIGHTS_LEN);
    let mut dropped = 0usize;
    for triple in triples {
        if packed.len() < PACKED_LIGHTS_LEN {
            packed.extend_from_slice(&triple);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        log::warn!(
            "{} lights past the capacity of {} were not packed",
            dropped,
            MAX_LIGHTS
        );
    }
    packed.resize(PACKED_LIGHTS_LEN, 0.0);
    packed
}

pub fn pack_directional_colors(lights: &[DirectionalLight]) -> Vec<f32> {
    pack_triples(lights.iter().map(|light| light.color))
}

pub fn pack_directional_vectors(lights: &[DirectionalLight]) -> Vec<f32> {
    pack_triples(lights.iter().map(|light| light.direction.into()))
}

pub fn pack_point_colors(lights: &[PointLight]) -> Vec<f32> {
    pack_triples(lights.iter().map(|light| light.color))
}

pub fn pack_point_positions(lights: &[PointLight]) -> Vec<f32> {
    pack_triples(lights.iter().map(|light| light.position.into()))
}

/// Re-expresses world-space point lights in the space of `view`.
pub fn to_view_space(lights: &[PointLight], view: &Matrix4<f32>) -> Vec<PointLight> {
    lights
        .iter()
        .map(|light| {
            let moved = view * light.position.extend(1.0);
            PointLight {
                position: moved.truncate(),
                color: light.color,
            }
        })
        .collect()
}
