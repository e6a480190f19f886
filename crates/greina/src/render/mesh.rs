//! # Mesh — GPU Mesh Storage With Sub-Meshes
//!
//! A mesh is one vertex buffer and one index buffer. A *sub-mesh* is a range
//! inside them: where its indices start, how many there are, and a base
//! vertex added to every index. Indirect draws select a sub-mesh purely
//! through these three numbers, so the fractal can instance any sub-mesh
//! without rebinding buffers.
//!
//! ## Built-In Mesh
//!
//! When the `MeshStore` is created it uploads one mesh packing both built-in
//! shapes:
//!
//! | Sub-mesh | Shape  | first index | indices | base vertex |
//! |----------|--------|-------------|---------|-------------|
//! | 0        | Cube   | 0           | 36      | 0           |
//! | 1        | Sphere | 36          | 3072    | 24          |
//!
//! Sphere indices are stored relative to the sphere's own first vertex, which
//! is why its base vertex is 24.

use wgpu::util::DeviceExt;

use super::backend::MeshHandle;
use super::shapes;
use super::vertex::MeshVertex;

/// One drawable range of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    pub index_start: u32,
    pub index_count: u32,
    pub base_vertex: i32,
}

/// A mesh that has been uploaded to GPU buffers.
pub(crate) struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub submeshes: Vec<SubMesh>,
}

/// Stores all uploaded meshes. Pre-populated with the built-in mesh.
pub(crate) struct MeshStore {
    meshes: Vec<GpuMesh>,
}

impl MeshStore {
    pub fn new(device: &wgpu::Device) -> Self {
        let mut store = Self { meshes: Vec::new() };

        let (vertices, indices, submeshes) = pack(&[shapes::cube(), shapes::sphere(32, 16)]);
        store.upload(device, &vertices, &indices, submeshes);

        store
    }

    /// Upload mesh data to the GPU and return a handle.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        vertices: &[MeshVertex],
        indices: &[u32],
        submeshes: Vec<SubMesh>,
    ) -> MeshHandle {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh vertex buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh index buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let handle = MeshHandle(self.meshes.len());
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            submeshes,
        });
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.0)
    }

    pub fn submesh(&self, handle: MeshHandle, submesh: usize) -> Option<&SubMesh> {
        self.get(handle).and_then(|m| m.submeshes.get(submesh))
    }
}

/// Concatenate shapes into one vertex/index pair, one sub-mesh per shape.
pub(crate) fn pack(shapes: &[(Vec<MeshVertex>, Vec<u32>)]) -> (Vec<MeshVertex>, Vec<u32>, Vec<SubMesh>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut submeshes = Vec::with_capacity(shapes.len());

    for (shape_vertices, shape_indices) in shapes {
        submeshes.push(SubMesh {
            index_start: indices.len() as u32,
            index_count: shape_indices.len() as u32,
            base_vertex: vertices.len() as i32,
        });
        vertices.extend_from_slice(shape_vertices);
        indices.extend_from_slice(shape_indices);
    }

    (vertices, indices, submeshes)
}

/// Well-known handle for the built-in mesh (sub-mesh 0 cube, 1 sphere).
pub fn mesh_primitives() -> MeshHandle {
    MeshHandle(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_offsets_each_shape() {
        let (vertices, indices, submeshes) = pack(&[shapes::cube(), shapes::sphere(32, 16)]);
        assert_eq!(
            submeshes,
            vec![
                SubMesh { index_start: 0, index_count: 36, base_vertex: 0 },
                SubMesh { index_start: 36, index_count: 3072, base_vertex: 24 },
            ]
        );
        assert_eq!(vertices.len(), 24 + 17 * 33);
        assert_eq!(indices.len(), 36 + 3072);
    }

    #[test]
    fn packed_indices_resolve_within_vertices() {
        let (vertices, indices, submeshes) = pack(&[shapes::cube(), shapes::sphere(8, 4)]);
        for s in &submeshes {
            let range = s.index_start as usize..(s.index_start + s.index_count) as usize;
            for &i in &indices[range] {
                assert!((i as i64 + s.base_vertex as i64) < vertices.len() as i64);
            }
        }
    }
}
