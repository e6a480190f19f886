//! # wgpu Backend — Storage Buffers and Indirect Draws
//!
//! [`WgpuBackend`] implements [`RenderBackend`] on a real device. Feeder
//! submissions are recorded during the tick and encoded later, when the frame's
//! render pass exists:
//!
//! ```text
//! tick:   feeder ──► upload_buffer_data ──► queue.write_buffer
//!                ──► draw_instanced_indirect ──► recorded draw list
//!
//! frame:  render_frame ──► encode(pass)
//!                          for each recorded draw:
//!                            group 1 = material, group 2 = level matrices
//!                            draw_indexed_indirect(args_buffer, args_offset)
//! ```
//!
//! Structured buffers are created with `STORAGE` usage and get a group 2 bind
//! group when allocated. Argument buffers use `INDIRECT` usage. Both are
//! checked against the device limits before creation; a request that does
//! not fit fails with [`FractalError::ResourceExhaustion`].

use super::backend::{
    BufferHandle, BufferKind, DrawList, IndirectDraw, MaterialHandle, MeshHandle, RenderBackend,
};
use super::camera::Camera;
use super::gpu::GpuContext;
use super::mesh::{MeshStore, SubMesh};
use super::pipeline::FractalPipeline;
use super::vertex::{MaterialUniform, MeshVertex};
use crate::error::{FractalError, Result};

use wgpu::util::DeviceExt;

/// Material used when a draw names none (or an unknown one).
pub const DEFAULT_MATERIAL: MaterialHandle = MaterialHandle(0);

const DEFAULT_BASE_COLOR: [f32; 4] = [0.85, 0.85, 0.9, 1.0];

struct GpuBuffer {
    buffer: wgpu::Buffer,
    kind: BufferKind,
    /// Group 2 binding, structured buffers only.
    bind_group: Option<wgpu::BindGroup>,
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// A [`RenderBackend`] that draws through wgpu.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub(crate) pipeline: FractalPipeline,
    meshes: MeshStore,
    materials: Vec<GpuMaterial>,
    buffers: Vec<Option<GpuBuffer>>,
    free_slots: Vec<usize>,
    draws: DrawList,
}

impl WgpuBackend {
    /// Create the pipeline, upload the built-in mesh, and register the
    /// default material.
    pub fn new(gpu: &GpuContext) -> Self {
        let mut backend = Self {
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            pipeline: FractalPipeline::new(gpu),
            meshes: MeshStore::new(&gpu.device),
            materials: Vec::new(),
            buffers: Vec::new(),
            free_slots: Vec::new(),
            draws: DrawList::default(),
        };
        backend.add_material(DEFAULT_BASE_COLOR);
        backend
    }

    /// Upload a mesh and return its handle.
    pub fn add_mesh(
        &mut self,
        vertices: &[MeshVertex],
        indices: &[u32],
        submeshes: Vec<SubMesh>,
    ) -> MeshHandle {
        self.meshes.upload(&self.device, vertices, indices, submeshes)
    }

    /// Register a flat-colored material.
    pub fn add_material(&mut self, base_color: [f32; 4]) -> MaterialHandle {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fractal material buffer"),
            contents: bytemuck::bytes_of(&MaterialUniform { base_color }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.pipeline.material_bind_group(&self.device, &buffer);
        let handle = MaterialHandle(self.materials.len());
        self.materials.push(GpuMaterial { buffer, bind_group });
        handle
    }

    /// Change a material's color. Unknown handles are ignored.
    pub fn set_material_color(&mut self, material: MaterialHandle, base_color: [f32; 4]) {
        if let Some(m) = self.materials.get(material.0) {
            self.queue
                .write_buffer(&m.buffer, 0, bytemuck::bytes_of(&MaterialUniform { base_color }));
        }
    }

    pub fn set_camera(&self, camera: &Camera, aspect: f32) {
        self.queue.write_buffer(
            &self.pipeline.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.uniform(aspect)),
        );
    }

    /// Follow a surface resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pipeline.resize_depth_if_needed(&self.device, width, height);
    }

    /// Number of draws recorded since the last [`encode`](Self::encode) or
    /// [`discard_draws`](Self::discard_draws).
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    /// Drop the recorded draws without encoding them.
    ///
    /// Call this when a frame cannot be rendered (surface lost, outdated, or
    /// timed out) so the draws do not pile up behind the next tick's.
    /// Returns how many were dropped.
    pub fn discard_draws(&mut self) -> usize {
        self.draws.discard()
    }

    /// Encode every recorded draw into `pass` and clear the record.
    ///
    /// Either this or [`discard_draws`](Self::discard_draws) must run once
    /// per frame.
    ///
    /// Draws without a mesh, or whose sub-mesh has no indices, are skipped.
    /// Returns the number of indirect draws encoded.
    pub fn encode(&mut self, pass: &mut wgpu::RenderPass<'_>) -> usize {
        let draws = self.draws.take();
        if draws.is_empty() {
            return 0;
        }

        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, &self.pipeline.camera_bind_group, &[]);

        let mut encoded = 0;
        for draw in &draws {
            let Some(mesh_handle) = draw.mesh else {
                continue;
            };
            if self.index_count(mesh_handle, draw.submesh) == 0 {
                continue;
            }
            let Some(mesh) = self.meshes.get(mesh_handle) else {
                continue;
            };
            let (Some(args), Some(instances)) = (
                self.buffer(draw.args_buffer),
                self.buffer(draw.matrices).and_then(|b| b.bind_group.as_ref()),
            ) else {
                log::warn!("Draw references a released buffer, skipped");
                continue;
            };
            let Some(material) = draw
                .material
                .and_then(|m| self.materials.get(m.0))
                .or_else(|| self.materials.get(DEFAULT_MATERIAL.0))
            else {
                continue;
            };

            pass.set_bind_group(1, &material.bind_group, &[]);
            pass.set_bind_group(2, instances, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed_indirect(&args.buffer, draw.args_offset);
            encoded += 1;
        }
        encoded
    }

    fn buffer(&self, handle: BufferHandle) -> Option<&GpuBuffer> {
        self.buffers.get(handle.0).and_then(Option::as_ref)
    }

    fn submesh(&self, mesh: MeshHandle, submesh: usize) -> Option<&SubMesh> {
        self.meshes.submesh(mesh, submesh)
    }

    fn max_buffer_bytes(&self, kind: BufferKind) -> u64 {
        let limits = self.device.limits();
        match kind {
            BufferKind::Structured => {
                (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size)
            }
            BufferKind::IndirectArguments => limits.max_buffer_size,
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn submesh_count(&self, mesh: MeshHandle) -> usize {
        self.meshes.get(mesh).map_or(0, |m| m.submeshes.len())
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
        if size == 0 {
            return Err(FractalError::InvalidConfiguration(format!(
                "zero-sized {kind:?} buffer requested"
            )));
        }
        let limit = self.max_buffer_bytes(kind);
        if size > limit {
            return Err(FractalError::ResourceExhaustion(format!(
                "{size} byte {kind:?} buffer exceeds the device limit of {limit} bytes"
            )));
        }

        let (label, usage) = match kind {
            BufferKind::Structured => ("fractal matrix buffer", wgpu::BufferUsages::STORAGE),
            BufferKind::IndirectArguments => ("fractal args buffer", wgpu::BufferUsages::INDIRECT),
        };
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = match kind {
            BufferKind::Structured => Some(self.pipeline.instance_bind_group(&self.device, &buffer)),
            BufferKind::IndirectArguments => None,
        };

        let entry = GpuBuffer {
            buffer,
            kind,
            bind_group,
        };
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.buffers[slot] = Some(entry);
                slot
            }
            None => {
                self.buffers.push(Some(entry));
                self.buffers.len() - 1
            }
        };
        log::trace!("Allocated {size} byte {kind:?} buffer in slot {slot}");
        Ok(BufferHandle(slot))
    }

    fn release_buffer(&mut self, handle: BufferHandle) {
        if let Some(slot) = self.buffers.get_mut(handle.0) {
            if let Some(entry) = slot.take() {
                entry.buffer.destroy();
                self.free_slots.push(handle.0);
            }
        }
    }

    fn upload_buffer_data(&mut self, handle: BufferHandle, byte_offset: u64, data: &[u8]) {
        let Some(entry) = self.buffer(handle) else {
            log::warn!("Upload to released buffer {handle:?} ignored");
            return;
        };
        if byte_offset + data.len() as u64 > entry.buffer.size() {
            log::warn!(
                "Upload of {} bytes at offset {byte_offset} overruns {:?} {handle:?}, ignored",
                data.len(),
                entry.kind
            );
            return;
        }
        self.queue.write_buffer(&entry.buffer, byte_offset, data);
    }

    fn draw_instanced_indirect(&mut self, draw: IndirectDraw) {
        self.draws.record(draw);
    }
}
