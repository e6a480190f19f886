//! # Greina — Instanced Fractal Tree
//!
//! A self-similar tree of parts, five children per part, rebuilt at a chosen
//! depth and animated every frame. Each depth level is drawn with a single
//! instanced indirect draw call whose instance matrices live in one storage
//! buffer per level.
//!
//! The core ([`fractal`]) is renderer-agnostic and talks to the GPU only
//! through [`RenderBackend`](render::RenderBackend). [`App`](app::App) runs
//! it in a window with wgpu; [`HeadlessBackend`](render::HeadlessBackend)
//! runs it anywhere.
//!
//! Start with `use greina::prelude::*`.

pub mod app;
pub mod config;
pub mod error;
pub mod fractal;
pub mod math;
pub mod prelude;
pub mod render;
pub mod time;
mod window;

#[cfg(feature = "hot-reload")]
pub mod asset;

#[cfg(feature = "diagnostics")]
pub mod diag;

pub use error::{FractalError, Result};
