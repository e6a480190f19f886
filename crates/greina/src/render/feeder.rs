//! # Render Feeder — From Tree Levels to Indirect Draws
//!
//! The feeder owns the GPU-side mirror of a [`FractalTree`]: one structured
//! buffer of instance matrices per level, and one indirect-arguments buffer
//! with a 20-byte slot per level.
//!
//! ```text
//! level 0 matrices ──► buffer 0 ─┐
//! level 1 matrices ──► buffer 1 ─┼──► draw L: matrices = buffer L
//! ...                            │            args     = args_buffer @ L × 20
//! level n matrices ──► buffer n ─┘
//! ```
//!
//! Every submission uploads the matrices, rewrites each level's argument slot
//! from the current mesh metadata, and emits exactly one draw per level. The
//! instance count of level `L` is its matrix count, `5^L`.

use crate::config::FractalConfig;
use crate::error::Result;
use crate::fractal::tree::FractalTree;
use crate::math::{Mat4, Vec3};

use super::backend::{
    Bounds, BufferHandle, BufferKind, DrawIndexedArgs, IndirectDraw, MaterialHandle, MeshHandle,
    RenderBackend,
};

/// Bounds edge length, in multiples of the object scale.
pub const BOUNDS_SCALE: f32 = 3.0;

const MATRIX_STRIDE: usize = std::mem::size_of::<Mat4>();

/// Counters for the most recent submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub levels: usize,
    pub instances: usize,
    pub draw_calls: usize,
}

/// Per-level GPU buffers and the draw submission for one fractal.
#[derive(Debug)]
pub struct RenderFeeder {
    matrix_buffers: Vec<BufferHandle>,
    args_buffer: BufferHandle,
    mesh: Option<MeshHandle>,
    submesh: usize,
    material: Option<MaterialHandle>,
    stats: RenderStats,
}

impl RenderFeeder {
    /// Allocate buffers sized for `tree`.
    ///
    /// Either everything is allocated or nothing is: on failure, buffers
    /// created so far are released before the error is returned.
    pub fn allocate(
        backend: &mut dyn RenderBackend,
        tree: &FractalTree,
        config: &FractalConfig,
    ) -> Result<Self> {
        let mut matrix_buffers = Vec::with_capacity(tree.depth());
        for level in tree.levels() {
            match backend.allocate_buffer(level.len(), MATRIX_STRIDE, BufferKind::Structured) {
                Ok(handle) => matrix_buffers.push(handle),
                Err(e) => {
                    release_all(backend, &matrix_buffers);
                    return Err(e);
                }
            }
        }

        let args_buffer = match backend.allocate_buffer(
            tree.depth(),
            DrawIndexedArgs::SIZE as usize,
            BufferKind::IndirectArguments,
        ) {
            Ok(handle) => handle,
            Err(e) => {
                release_all(backend, &matrix_buffers);
                return Err(e);
            }
        };

        log::debug!(
            "Allocated {} matrix buffers and {} argument slots",
            matrix_buffers.len(),
            tree.depth()
        );

        Ok(Self {
            matrix_buffers,
            args_buffer,
            mesh: config.mesh,
            submesh: config.submesh_index,
            material: config.material,
            stats: RenderStats::default(),
        })
    }

    /// Return every buffer to the backend.
    pub fn release(self, backend: &mut dyn RenderBackend) {
        release_all(backend, &self.matrix_buffers);
        backend.release_buffer(self.args_buffer);
    }

    /// Upload the current matrices and submit one indirect draw per level.
    ///
    /// An unallocated tree submits nothing.
    pub fn submit(&mut self, backend: &mut dyn RenderBackend, tree: &FractalTree, object_scale: f32) {
        if !tree.is_allocated() {
            self.stats = RenderStats::default();
            return;
        }
        let args = self.base_args(backend);
        let bounds = Bounds::new(tree.root().world_position, Vec3::splat(BOUNDS_SCALE * object_scale));

        let mut stats = RenderStats::default();
        for (l, (level, &matrices)) in tree.levels().iter().zip(&self.matrix_buffers).enumerate() {
            backend.upload_buffer_data(matrices, 0, bytemuck::cast_slice(&level.matrices));

            let level_args = match self.mesh {
                Some(_) => DrawIndexedArgs {
                    instance_count: level.len() as u32,
                    ..args
                },
                None => DrawIndexedArgs::ZERO,
            };
            let args_offset = l as u64 * DrawIndexedArgs::SIZE;
            backend.upload_buffer_data(self.args_buffer, args_offset, bytemuck::bytes_of(&level_args));

            backend.draw_instanced_indirect(IndirectDraw {
                mesh: self.mesh,
                submesh: self.submesh,
                material: self.material,
                bounds,
                args_buffer: self.args_buffer,
                args_offset,
                matrices,
            });

            stats.levels += 1;
            stats.instances += level.len();
            stats.draw_calls += 1;
        }
        self.stats = stats;
    }

    /// Arguments shared by every level; only the instance count differs.
    fn base_args(&self, backend: &dyn RenderBackend) -> DrawIndexedArgs {
        let Some(mesh) = self.mesh else {
            return DrawIndexedArgs::ZERO;
        };
        DrawIndexedArgs {
            index_count: backend.index_count(mesh, self.submesh),
            instance_count: 0,
            first_index: backend.index_start(mesh, self.submesh),
            base_vertex: backend.base_vertex(mesh, self.submesh),
            first_instance: 0,
        }
    }

    pub fn matrix_buffers(&self) -> &[BufferHandle] {
        &self.matrix_buffers
    }

    pub fn args_buffer(&self) -> BufferHandle {
        self.args_buffer
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }
}

fn release_all(backend: &mut dyn RenderBackend, handles: &[BufferHandle]) {
    for &handle in handles {
        backend.release_buffer(handle);
    }
}
