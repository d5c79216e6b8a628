//! # Primitive Shape Generation
//!
//! Geometry tables for the built-in shapes.

use super::GeometryData;

/// Texture coordinates of one quad face, repeated per face.
const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Generate a cube spanning -1 to 1 on every axis
///
/// Each face has its own four vertices so normals stay flat.
pub fn cube() -> GeometryData {
    #[rustfmt::skip]
    let positions = vec![
        // Front face
        [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0],
        // Back face
        [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
        // Top face
        [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0],
        // Bottom face
        [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
        // Right face
        [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0],
        // Left face
        [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
    ];

    let normals = face_normals
        .iter()
        .flat_map(|normal| [*normal; 4])
        .collect();

    let triangles = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [[base, base + 1, base + 2], [base, base + 2, base + 3]]
        })
        .collect();

    GeometryData {
        positions,
        triangles,
        normals: Some(normals),
        tex_coords: QUAD_TEX_COORDS.repeat(6),
    }
}

/// Generate a 2x2 quad at `y = 1` facing up
pub fn plane() -> GeometryData {
    GeometryData {
        positions: vec![
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
        ],
        triangles: vec![[0, 1, 2], [0, 2, 3]],
        normals: Some(vec![[0.0, 1.0, 0.0]; 4]),
        tex_coords: QUAD_TEX_COORDS.to_vec(),
    }
}

/// Generate a regular icosahedron with golden-ratio proportions
///
/// Every face gets its own three vertices and no normals are supplied, so the
/// primitive derives flat face normals.
pub fn icosahedron() -> GeometryData {
    let l = (1.0 + 5.0f32.sqrt()) / 2.0;
    let h = 1.0;

    let corners = [
        [-h, l, 0.0],
        [h, l, 0.0],
        [-h, -l, 0.0],
        [h, -l, 0.0],
        [0.0, -h, l],
        [0.0, h, l],
        [0.0, -h, -l],
        [0.0, h, -l],
        [l, 0.0, -h],
        [l, 0.0, h],
        [-l, 0.0, -h],
        [-l, 0.0, h],
    ];

    #[rustfmt::skip]
    let faces: [[usize; 3]; 20] = [
        [0, 5, 1],  [0, 11, 5], [0, 10, 11], [0, 7, 10], [0, 1, 7],
        [1, 5, 9],  [5, 4, 9],  [5, 11, 4],  [11, 2, 4], [11, 10, 2],
        [10, 6, 2], [10, 7, 6], [7, 8, 6],   [7, 1, 8],  [1, 9, 8],
        [3, 9, 4],  [3, 4, 2],  [3, 2, 6],   [3, 6, 8],  [3, 8, 9],
    ];

    let positions = faces
        .iter()
        .flat_map(|face| face.map(|corner| corners[corner]))
        .collect();
    let triangles = (0..20u32)
        .map(|face| [face * 3, face * 3 + 1, face * 3 + 2])
        .collect();
    // the first three coordinates of each face's quad mapping
    let tex_coords = (0..20).flat_map(|_| QUAD_TEX_COORDS[..3].to_vec()).collect();

    GeometryData {
        positions,
        triangles,
        normals: None,
        tex_coords,
    }
}

/// Generate a screen-space quad from a pixel rectangle
///
/// `(x, y)` and `(dx, dy)` are opposite corners in pixels with the origin at
/// the bottom-left of a `viewport` of `(width, height)` pixels. Positions come
/// out in normalized device coordinates with `z = 0`.
pub fn ui_quad(x: f32, y: f32, dx: f32, dy: f32, viewport: (f32, f32)) -> GeometryData {
    let (width, height) = viewport;
    let to_ndc = |px: f32, py: f32| [px / (width / 2.0) - 1.0, py / (height / 2.0) - 1.0, 0.0];

    GeometryData {
        positions: vec![to_ndc(x, y), to_ndc(dx, y), to_ndc(dx, dy), to_ndc(x, dy)],
        triangles: vec![[0, 1, 2], [0, 2, 3]],
        normals: Some(vec![[0.0, 0.0, 1.0]; 4]),
        tex_coords: QUAD_TEX_COORDS.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::derive_normals;

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    fn assert_consistent(data: &GeometryData) {
        let n = data.vertex_count();
        assert_eq!(data.tex_coords.len(), n);
        assert_eq!(data.resolved_normals().unwrap().len(), n);
        for triangle in &data.triangles {
            assert!(triangle.iter().all(|&i| (i as usize) < n));
        }
    }

    #[test]
    fn test_cube_generation() {
        let cube = cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_consistent(&cube);

        // winding agrees with the supplied normals
        let derived = derive_normals(&cube.positions, &cube.triangles).unwrap();
        let supplied = cube.normals.clone().unwrap();
        for (d, s) in derived.iter().zip(&supplied) {
            assert!(dot(*d, *s) > 0.99);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = plane();
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
        assert_consistent(&plane);
    }

    #[test]
    fn test_icosahedron_normals_point_outward() {
        let ico = icosahedron();
        assert_eq!(ico.vertex_count(), 60);
        assert_eq!(ico.triangle_count(), 20);
        assert_consistent(&ico);

        let normals = ico.resolved_normals().unwrap();
        for (position, normal) in ico.positions.iter().zip(&normals) {
            assert!(dot(*position, *normal) > 0.0);
            assert!((dot(*normal, *normal) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ui_quad_maps_pixels_to_ndc() {
        let quad = ui_quad(0.0, 0.0, 400.0, 300.0, (800.0, 600.0));
        assert_eq!(quad.positions[0], [-1.0, -1.0, 0.0]);
        assert_eq!(quad.positions[2], [0.0, 0.0, 0.0]);
        assert_consistent(&quad);
    }
}
