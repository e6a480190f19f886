//! Common re-exports. `use greina::prelude::*` brings in everything a host needs.

pub use crate::app::App;
pub use crate::config::FractalConfig;
pub use crate::error::{FractalError, Result};
pub use crate::fractal::{Fractal, FractalPart, FractalTree, MAX_DEPTH, MIN_DEPTH};
pub use crate::math::{Mat4, Quat, Transform, Vec3, Vec4};
pub use crate::render::{
    Camera, ClearColor, DrawIndexedArgs, HeadlessBackend, MaterialHandle, MeshHandle,
    RenderBackend, SubMesh, WgpuBackend, mesh_primitives,
};
pub use crate::time::Time;
#[cfg(feature = "hot-reload")]
pub use crate::asset::ConfigWatcher;
#[cfg(feature = "diagnostics")]
pub use crate::diag::{DisplayMode, FrameRateCounter, FrameRateReport};
