//! App builder for the windowed fractal runner.
//!
//! The [`App`] collects the fractal configuration and scene settings, then
//! runs the winit event loop. Each frame the fractal is ticked with the frame
//! time and its draws are rendered through the [`WgpuBackend`](crate::render::WgpuBackend).
//!
//! ## Example
//!
//! ```ignore
//! use greina::prelude::*;
//!
//! fn main() {
//!     App::new(FractalConfig::default().with_depth(6).with_mesh(mesh_primitives(), 1))
//!         .set_title("fractal")
//!         .run();
//! }
//! ```

use std::path::PathBuf;

use winit::event_loop::EventLoop;

use crate::config::FractalConfig;
use crate::math::Transform;
use crate::render::ClearColor;
use crate::window::WinitApp;

/// Everything the runner needs before the window exists.
#[derive(Debug, Clone)]
pub(crate) struct AppSettings {
    pub config: FractalConfig,
    pub placement: Transform,
    pub title: String,
    pub clear_color: ClearColor,
    pub base_color: [f32; 4],
    /// Camera orbit speed in radians per second; 0 holds it still.
    pub orbit_speed: f32,
    pub config_path: Option<PathBuf>,
}

/// The app builder. Configure the fractal, then call [`run()`](App::run).
pub struct App {
    settings: AppSettings,
}

impl App {
    pub fn new(config: FractalConfig) -> Self {
        Self {
            settings: AppSettings {
                config,
                placement: Transform::IDENTITY,
                title: String::from("greina"),
                clear_color: ClearColor::default(),
                base_color: [0.9, 0.6, 0.25, 1.0],
                orbit_speed: 0.2,
                config_path: None,
            },
        }
    }

    /// Set the window title.
    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.settings.title = title.into();
        self
    }

    /// Place the fractal in the world. The X scale is the object scale.
    pub fn with_placement(mut self, placement: Transform) -> Self {
        self.settings.placement = placement;
        self
    }

    pub fn with_clear_color(mut self, clear_color: ClearColor) -> Self {
        self.settings.clear_color = clear_color;
        self
    }

    /// Color of the material used when the config names none.
    pub fn with_base_color(mut self, base_color: [f32; 4]) -> Self {
        self.settings.base_color = base_color;
        self
    }

    pub fn with_orbit_speed(mut self, radians_per_second: f32) -> Self {
        self.settings.orbit_speed = radians_per_second;
        self
    }

    /// Reload the config whenever `path` changes on disk and rebuild the
    /// fractal with it.
    ///
    /// Without the `hot-reload` feature the path is only remembered.
    pub fn watch_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.config_path = Some(path.into());
        self
    }

    /// Start the event loop. This function does not return.
    pub fn run(self) -> ! {
        #[cfg(feature = "diagnostics")]
        crate::diag::init_logger();
        #[cfg(not(feature = "diagnostics"))]
        let _ = env_logger::try_init();

        let event_loop = EventLoop::new().expect("Failed to create event loop");
        event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

        let mut app = WinitApp::new(self.settings);
        event_loop.run_app(&mut app).expect("Event loop error");

        std::process::exit(0);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(FractalConfig::default())
    }
}
