//! Rendering: the backend contract, the per-level feeder, and two backends.
//!
//! The fractal code only sees [`RenderBackend`]. [`RenderFeeder`] turns tree
//! levels into buffer uploads and indirect draws; [`WgpuBackend`] executes
//! them on a GPU and [`HeadlessBackend`] records them in memory.

pub mod backend;
pub mod camera;
pub mod feeder;
pub mod gpu;
pub mod headless;
pub mod mesh;
pub mod pass;
pub(crate) mod pipeline;
pub(crate) mod shapes;
pub mod vertex;
pub mod wgpu_backend;

pub use backend::{
    Bounds, BufferHandle, BufferKind, DrawIndexedArgs, DrawList, IndirectDraw, MaterialHandle,
    MeshHandle, RenderBackend,
};
pub use camera::Camera;
pub use feeder::{RenderFeeder, RenderStats};
pub use gpu::GpuContext;
pub use headless::HeadlessBackend;
pub use mesh::{SubMesh, mesh_primitives};
pub use pass::{ClearColor, render_frame};
pub use vertex::MeshVertex;
pub use wgpu_backend::{DEFAULT_MATERIAL, WgpuBackend};
