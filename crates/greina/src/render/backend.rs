//! # Backend — The Rendering Contract
//!
//! The fractal never talks to a GPU API directly. Everything it needs from a
//! renderer goes through [`RenderBackend`]:
//!
//! ```text
//! ┌──────────────────────────────┐      ┌───────────────────────────────┐
//! │ RenderFeeder                 │      │ RenderBackend                 │
//! │                              │      │                               │
//! │  allocate ───────────────────┼─────►│ allocate_buffer / release     │
//! │  submit:                     │      │                               │
//! │    matrices ─────────────────┼─────►│ upload_buffer_data            │
//! │    mesh metadata ◄───────────┼──────│ index_count / index_start /   │
//! │                              │      │ base_vertex                   │
//! │    args + bounds ────────────┼─────►│ draw_instanced_indirect       │
//! └──────────────────────────────┘      └───────────────────────────────┘
//! ```
//!
//! Two backends ship with the crate: [`WgpuBackend`](super::WgpuBackend) for
//! real rendering and [`HeadlessBackend`](super::HeadlessBackend), which keeps
//! everything in memory and records what it was asked to draw.
//!
//! ## Indirect Arguments
//!
//! An indexed indirect draw reads five `u32`s from a GPU buffer:
//!
//! ```text
//! offset  0: index_count     indices per instance
//! offset  4: instance_count
//! offset  8: first_index     where the sub-mesh starts in the index buffer
//! offset 12: base_vertex     added to every index (signed)
//! offset 16: first_instance
//! ```
//!
//! This matches wgpu's `DrawIndexedIndirectArgs` byte for byte.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::Vec3;

/// Handle to a mesh owned by the backend. Lightweight and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub usize);

/// Handle to a material owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub usize);

/// Handle to a buffer allocated through [`RenderBackend::allocate_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub usize);

/// What a buffer is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Read-only structured data bound to the shader (per-instance matrices).
    Structured,
    /// Indirect draw arguments.
    IndirectArguments,
}

/// Indexed indirect draw arguments. 20 bytes, GPU layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl DrawIndexedArgs {
    /// Size of one argument slot in bytes.
    pub const SIZE: u64 = std::mem::size_of::<DrawIndexedArgs>() as u64;

    /// Arguments that draw nothing.
    pub const ZERO: Self = Self {
        index_count: 0,
        instance_count: 0,
        first_index: 0,
        base_vertex: 0,
        first_instance: 0,
    };
}

/// Axis-aligned bounding box used for culling a whole draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Bounds {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

/// One instanced indirect draw, as submitted by the feeder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndirectDraw {
    /// `None` when no mesh is bound; the draw is a no-op.
    pub mesh: Option<MeshHandle>,
    pub submesh: usize,
    pub material: Option<MaterialHandle>,
    pub bounds: Bounds,
    pub args_buffer: BufferHandle,
    /// Byte offset of this draw's argument slot in `args_buffer`.
    pub args_offset: u64,
    /// Per-instance matrices, indexed by instance id in the shader.
    pub matrices: BufferHandle,
}

/// Draws recorded during a tick, waiting for a consumer.
///
/// Backends push into it from [`RenderBackend::draw_instanced_indirect`].
/// Whoever consumes the draws must empty it every frame, either with
/// [`take`](Self::take) or, when the frame cannot be rendered, with
/// [`discard`](Self::discard). Otherwise stale draws pile up behind the
/// next tick's.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    draws: Vec<IndirectDraw>,
}

impl DrawList {
    pub fn record(&mut self, draw: IndirectDraw) {
        self.draws.push(draw);
    }

    /// Remove and return every recorded draw.
    pub fn take(&mut self) -> Vec<IndirectDraw> {
        std::mem::take(&mut self.draws)
    }

    /// Drop every recorded draw. Returns how many were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.draws.len();
        self.draws.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn as_slice(&self) -> &[IndirectDraw] {
        &self.draws
    }
}

/// What the fractal needs from a renderer.
pub trait RenderBackend {
    /// Number of sub-meshes in `mesh`; 0 for an unknown handle.
    fn submesh_count(&self, mesh: MeshHandle) -> usize;
    fn index_count(&self, mesh: MeshHandle, submesh: usize) -> u32;
    fn index_start(&self, mesh: MeshHandle, submesh: usize) -> u32;
    fn base_vertex(&self, mesh: MeshHandle, submesh: usize) -> i32;

    /// Allocate a buffer of `element_count × stride` bytes.
    ///
    /// Fails with [`ResourceExhaustion`](crate::FractalError::ResourceExhaustion)
    /// when the size exceeds the backend's limits.
    fn allocate_buffer(
        &mut self,
        element_count: usize,
        stride: usize,
        kind: BufferKind,
    ) -> Result<BufferHandle>;

    fn release_buffer(&mut self, handle: BufferHandle);

    /// Write `data` into the buffer starting at `byte_offset`.
    fn upload_buffer_data(&mut self, handle: BufferHandle, byte_offset: u64, data: &[u8]);

    fn draw_instanced_indirect(&mut self, draw: IndirectDraw);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_args_match_gpu_layout() {
        assert_eq!(DrawIndexedArgs::SIZE, 20);
        let args = DrawIndexedArgs {
            index_count: 36,
            instance_count: 25,
            first_index: 6,
            base_vertex: -2,
            first_instance: 0,
        };
        let words: [u32; 5] = bytemuck::cast(args);
        assert_eq!(words, [36, 25, 6, (-2i32) as u32, 0]);
    }

    fn draw_at(slot: u64) -> IndirectDraw {
        IndirectDraw {
            mesh: Some(MeshHandle(0)),
            submesh: 0,
            material: None,
            bounds: Bounds::new(Vec3::ZERO, Vec3::ONE),
            args_buffer: BufferHandle(0),
            args_offset: slot * DrawIndexedArgs::SIZE,
            matrices: BufferHandle(1 + slot as usize),
        }
    }

    #[test]
    fn discarded_draws_do_not_reach_the_next_frame() {
        let mut list = DrawList::default();
        // A frame that could not be rendered.
        for slot in 0..3 {
            list.record(draw_at(slot));
        }
        assert_eq!(list.discard(), 3);
        assert!(list.is_empty());

        // The next tick records only its own draws.
        for slot in 0..3 {
            list.record(draw_at(slot));
        }
        let taken = list.take();
        assert_eq!(taken.len(), 3);
        assert_eq!(taken[2].args_offset, 40);
        assert_eq!(list.len(), 0);
        assert_eq!(list.discard(), 0);
    }

    #[test]
    fn bounds_contains_its_extent() {
        let b = Bounds::new(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(3.0));
        assert_eq!(b.min(), Vec3::new(-0.5, -1.5, -1.5));
        assert_eq!(b.max(), Vec3::new(2.5, 1.5, 1.5));
        assert!(b.contains(Vec3::new(2.5, 0.0, 0.0)));
        assert!(!b.contains(Vec3::new(2.6, 0.0, 0.0)));
    }
}
