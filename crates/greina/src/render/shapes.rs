//! # Shapes — Built-In Instance Meshes
//!
//! The demo runner needs something to instance. These generators produce a
//! unit cube and a UV sphere, both centered at the origin and fitting in the
//! unit box, so a part at scale `s` occupies an `s`-sized cell of the fractal.
//!
//! All triangles use counter-clockwise winding viewed from outside, matching
//! the pipeline's `FrontFace::Ccw` and back-face culling. Cube faces carry
//! their own four vertices so each face gets a flat normal.

use super::vertex::MeshVertex;

/// Generate a unit cube centered at the origin (side length 1.0).
///
/// Returns 24 vertices (4 per face for correct normals) and 36 indices.
pub(crate) fn cube() -> (Vec<MeshVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    // (normal, tangent_u, tangent_v) for each face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let corners = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let h = 0.5_f32;

    for (normal, u_dir, v_dir) in &faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            let position = std::array::from_fn(|axis| {
                normal[axis] * h + u_dir[axis] * corner[0] * h + v_dir[axis] * corner[1] * h
            });
            vertices.push(MeshVertex {
                position,
                normal: *normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Generate a UV sphere centered at origin with radius 0.5.
///
/// `segments` divides longitude, `rings` divides latitude.
pub(crate) fn sphere(segments: u32, rings: u32) -> (Vec<MeshVertex>, Vec<u32>) {
    let radius = 0.5_f32;
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * std::f32::consts::PI;

        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * std::f32::consts::TAU;

            let x = phi.sin() * theta.cos();
            let y = phi.cos();
            let z = phi.sin() * theta.sin();

            vertices.push(MeshVertex {
                position: [x * radius, y * radius, z * radius],
                normal: [x, y, z],
                uv: [u, v],
            });
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;
            indices.extend_from_slice(&[current, next, current + 1]);
            indices.extend_from_slice(&[current + 1, next, next + 1]);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_length(n: [f32; 3]) -> f32 {
        (n[0].powi(2) + n[1].powi(2) + n[2].powi(2)).sqrt()
    }

    #[test]
    fn cube_has_correct_counts() {
        let (verts, idxs) = cube();
        assert_eq!(verts.len(), 24, "cube should have 24 vertices (4 per face)");
        assert_eq!(idxs.len(), 36, "cube should have 36 indices (6 per face)");
    }

    #[test]
    fn cube_fits_unit_box() {
        let (verts, _) = cube();
        for v in &verts {
            for c in v.position {
                assert!((c.abs() - 0.5).abs() < 1e-6, "corner coordinate {c}");
            }
        }
    }

    #[test]
    fn sphere_has_correct_counts() {
        let (verts, idxs) = sphere(32, 16);
        assert_eq!(verts.len(), (17 * 33) as usize);
        assert_eq!(idxs.len(), (16 * 32 * 6) as usize);
    }

    #[test]
    fn normals_are_unit_length() {
        let (cube_v, _) = cube();
        let (sphere_v, _) = sphere(8, 4);
        for v in cube_v.iter().chain(&sphere_v) {
            let len = unit_length(v.normal);
            assert!((len - 1.0).abs() < 1e-5, "normal should be unit length, got {len}");
        }
    }

    #[test]
    fn indices_in_range() {
        for (verts, idxs) in [cube(), sphere(8, 4)] {
            for &idx in &idxs {
                assert!((idx as usize) < verts.len(), "index {idx} out of range");
            }
        }
    }
}
