//! # Procedural Geometry
//!
//! Static geometry tables for common shapes. These are plain data: hand a
//! [`GeometryData`] to [`PrimitiveDescriptor`](crate::gfx::scene::PrimitiveDescriptor)
//! and the scene takes it from there.
//!
//! ## Supported Shapes
//!
//! - **Cube**: 2x2x2 cube, 4 vertices per face
//! - **Plane**: 2x2 quad lying at `y = 1`
//! - **Icosahedron**: 20 flat-shaded faces, normals derived from the faces
//! - **UI quad**: pixel rectangle mapped to normalized device coordinates
//!
//! ## Usage
//!
//! ```rust
//! use glint::gfx::geometry::{cube, icosahedron};
//!
//! let cube_data = cube();
//! assert_eq!(cube_data.vertex_count(), 24);
//!
//! let ico = icosahedron();
//! assert_eq!(ico.triangle_count(), 20);
//! ```

pub mod primitives;

use crate::error::ConstructionError;

pub use primitives::*;

/// Geometry handed to a primitive constructor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub positions: Vec<[f32; 3]>,
    /// Triangles as vertex index triples (counter-clockwise winding)
    pub triangles: Vec<[u32; 3]>,
    /// Per-vertex normals, derived from the triangles when `None`
    pub normals: Option<Vec<[f32; 3]>>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// The supplied normals, or normals derived from the triangles.
    pub fn resolved_normals(&self) -> Result<Vec<[f32; 3]>, ConstructionError> {
        match &self.normals {
            Some(normals) => Ok(normals.clone()),
            None => derive_normals(&self.positions, &self.triangles),
        }
    }
}

/// Per-vertex normals from the first triangle that uses each vertex.
///
/// A vertex no triangle references gets `(0, 1, 0)`. Fails when a triangle
/// references a point that does not exist.
pub fn derive_normals(
    positions: &[[f32; 3]],
    triangles: &[[u32; 3]],
) -> Result<Vec<[f32; 3]>, ConstructionError> {
    use cgmath::{InnerSpace, Vector3};

    let points = positions.len();
    let mut normals = vec![[0.0, 1.0, 0.0]; points];
    let mut seen = vec![false; points];

    for (index, triangle) in triangles.iter().enumerate() {
        if let Some(&missing) = triangle.iter().find(|&&i| i as usize >= points) {
            return Err(ConstructionError::IndexOutOfRange {
                triangle: index,
                index: missing,
                points,
            });
        }

        for corner in 0..3 {
            let i = triangle[corner] as usize;
            if seen[i] {
                continue;
            }
            seen[i] = true;

            let here = Vector3::from(positions[i]);
            let previous = Vector3::from(positions[triangle[(corner + 2) % 3] as usize]);
            let next = Vector3::from(positions[triangle[(corner + 1) % 3] as usize]);

            let normal = (previous - here).cross(here - next);
            if normal.magnitude2() > 0.0 {
                normals[i] = normal.normalize().into();
            }
        }
    }

    Ok(normals)
}
