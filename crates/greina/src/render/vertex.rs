//! # Vertex — Mesh Vertices and Uniform Layouts
//!
//! ## Memory Layout
//!
//! ```text
//! MeshVertex (32 bytes)
//! ┌──────────────┬──────────────┬──────────────┐
//! │ position     │ normal       │ uv           │
//! │ [f32; 3]     │ [f32; 3]     │ [f32; 2]     │
//! │ offset 0     │ offset 12    │ offset 24    │
//! │ location(0)  │ location(1)  │ location(2)  │
//! └──────────────┴──────────────┴──────────────┘
//! ```
//!
//! ## Bind Groups
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Group 0 — Camera (per frame)                                │
//! │   view_proj: mat4x4  +  camera_pos: vec3  +  padding        │
//! │   80 bytes, uniform                                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Group 1 — Material (per material)                           │
//! │   base_color: vec4                                          │
//! │   16 bytes, uniform                                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Group 2 — Instances (per level)                             │
//! │   matrices: array<mat4x4>, 64 bytes per instance            │
//! │   read-only storage, indexed by @builtin(instance_index)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike a per-object uniform with dynamic offsets, the instance matrices
//! live in one storage buffer per fractal level. A single indirect draw then
//! covers the whole level.

use bytemuck::{Pod, Zeroable};

/// Per-vertex data for meshes: position, surface normal, and texture UV.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position: vec3<f32>
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal: vec3<f32>
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv: vec2<f32>
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// Camera uniform: view-projection matrix + world-space position.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4], // 64 bytes
    pub camera_pos: [f32; 3],     // 12 bytes
    pub _padding: f32,            // 4 bytes → total 80
}

/// Material uniform: a flat base color.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct MaterialUniform {
    pub base_color: [f32; 4], // 16 bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
    }
}
