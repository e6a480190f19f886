//! # Headless Backend — Rendering Without a GPU
//!
//! [`HeadlessBackend`] implements [`RenderBackend`] entirely in CPU memory.
//! Buffers are byte vectors, meshes are lists of sub-mesh ranges, and every
//! draw submission is appended to a log instead of being executed.
//!
//! It serves two purposes:
//!
//! - **Headless runs**: drive the fractal from a server, a benchmark, or a
//!   batch job and inspect the exact instance matrices the GPU would receive.
//! - **Tests**: everything the feeder uploads or submits can be read back.
//!
//! An optional byte limit makes oversized allocations fail with
//! [`FractalError::ResourceExhaustion`], the same way the wgpu backend does
//! when a request exceeds the device limits.

use super::backend::{
    BufferHandle, BufferKind, DrawIndexedArgs, DrawList, IndirectDraw, MeshHandle, RenderBackend,
};
use super::mesh::SubMesh;
use crate::error::{FractalError, Result};
use crate::math::Mat4;

struct HeadlessBuffer {
    kind: BufferKind,
    data: Vec<u8>,
}

/// A [`RenderBackend`] that records instead of rendering.
#[derive(Default)]
pub struct HeadlessBackend {
    meshes: Vec<Vec<SubMesh>>,
    buffers: Vec<Option<HeadlessBuffer>>,
    free_slots: Vec<usize>,
    draws: DrawList,
    max_buffer_bytes: Option<u64>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject allocations larger than `bytes`.
    pub fn with_buffer_limit(mut self, bytes: u64) -> Self {
        self.max_buffer_bytes = Some(bytes);
        self
    }

    /// Register a mesh described by its sub-mesh ranges.
    pub fn add_mesh(&mut self, submeshes: Vec<SubMesh>) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len());
        self.meshes.push(submeshes);
        handle
    }

    /// Number of buffers currently allocated.
    pub fn live_buffers(&self) -> usize {
        self.buffers.iter().filter(|b| b.is_some()).count()
    }

    pub fn buffer_kind(&self, handle: BufferHandle) -> Option<BufferKind> {
        self.buffer(handle).map(|b| b.kind)
    }

    /// Raw contents of a live buffer.
    pub fn buffer_data(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffer(handle).map(|b| b.data.as_slice())
    }

    /// Every draw submitted since the last [`take_draws`](Self::take_draws).
    pub fn draws(&self) -> &[IndirectDraw] {
        self.draws.as_slice()
    }

    /// Drain the draw log (call once per frame in long headless runs).
    pub fn take_draws(&mut self) -> Vec<IndirectDraw> {
        self.draws.take()
    }

    /// Read back the argument slot a draw points at.
    pub fn draw_args(&self, draw: &IndirectDraw) -> Option<DrawIndexedArgs> {
        let data = self.buffer_data(draw.args_buffer)?;
        let start = draw.args_offset as usize;
        let bytes = data.get(start..start + DrawIndexedArgs::SIZE as usize)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Read back the instance matrices a draw binds.
    pub fn draw_matrices(&self, draw: &IndirectDraw) -> Option<Vec<Mat4>> {
        let data = self.buffer_data(draw.matrices)?;
        Some(
            data.chunks_exact(std::mem::size_of::<Mat4>())
                .map(bytemuck::pod_read_unaligned)
                .collect(),
        )
    }

    fn buffer(&self, handle: BufferHandle) -> Option<&HeadlessBuffer> {
        self.buffers.get(handle.0).and_then(Option::as_ref)
    }

    fn submesh(&self, mesh: MeshHandle, submesh: usize) -> Option<&SubMesh> {
        self.meshes.get(mesh.0).and_then(|m| m.get(submesh))
    }
}

impl RenderBackend for HeadlessBackend {
    fn submesh_count(&self, mesh: MeshHandle) -> usize {
        self.meshes.get(mesh.0).map_or(0, Vec::len)
    }

    fn index_count(&self, mesh: MeshHandle, submesh: usize) -> u32 {
        self.submesh(mesh, submesh).map_or(0, |s| s.index_count)
    }

    fn index_start(&self, mesh: MeshHandle, submesh: usize) -> u32 {
        self.submesh(mesh, submesh).map_or(0, |s| s.index_start)
    }

    fn base_vertex(&self, mesh: MeshHandle, submesh: usize) -> i32 {
        self.submesh(mesh, submesh).map_or(0, |s| s.base_vertex)
    }

    fn allocate_buffer(
        &mut self,
        element_count: usize,
        stride: usize,
        kind: BufferKind,
    ) -> Result<BufferHandle> {
        let size = element_count as u64 * stride as u64;
        if let Some(limit) = self.max_buffer_bytes {
            if size > limit {
                return Err(FractalError::ResourceExhaustion(format!(
                    "{size} byte {kind:?} buffer exceeds the {limit} byte limit"
                )));
            }
        }

        let buffer = HeadlessBuffer {
            kind,
            data: vec![0; size as usize],
        };
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.buffers[slot] = Some(buffer);
                slot
            }
            None => {
                self.buffers.push(Some(buffer));
                self.buffers.len() - 1
            }
        };
        Ok(BufferHandle(slot))
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        if let Some(slot) = self.buffers.get_mut(handle.0) {
            if slot.take().is_some() {
                self.free_slots.push(handle.0);
            }
        }
    }

    fn upload_buffer_data(&mut self, handle: BufferHandle, byte_offset: u64, data: &[u8]) {
        let Some(Some(buffer)) = self.buffers.get_mut(handle.0) else {
            log::warn!("Upload to released buffer {handle:?} ignored");
            return;
        };
        let start = byte_offset as usize;
        let end = start + data.len();
        if end > buffer.data.len() {
            log::warn!(
                "Upload of {} bytes at offset {start} overruns {handle:?} ({} bytes), ignored",
                data.len(),
                buffer.data.len()
            );
            return;
        }
        buffer.data[start..end].copy_from_slice(data);
    }

    fn draw_instanced_indirect(&mut self, draw: IndirectDraw) {
        self.draws.record(draw);
    }
}
