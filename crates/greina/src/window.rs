//! Window management via winit.
//!
//! Implements [`winit::application::ApplicationHandler`] to drive the event
//! loop: window and GPU creation, resize, keyboard controls, and the frame
//! loop (tick the fractal, then render).
//!
//! Keys: `1`–`8` rebuild the fractal at that depth, `Space` pauses the
//! animation, `Escape` quits. With `diagnostics`, `F` switches the frame-rate
//! report between FPS and milliseconds.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::app::AppSettings;
use crate::config::FractalConfig;
use crate::fractal::Fractal;
use crate::math::Vec3;
use crate::render::{Camera, DEFAULT_MATERIAL, GpuContext, WgpuBackend, render_frame};
use crate::time::Time;

/// Window, GPU and backend. Created together on the first `resumed`.
struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    backend: WgpuBackend,
}

/// The application state that winit drives.
pub(crate) struct WinitApp {
    settings: AppSettings,
    graphics: Option<Graphics>,
    fractal: Fractal,
    camera: Camera,
    time: Time,
    paused: bool,
    orbit_angle: f32,
    #[cfg(feature = "hot-reload")]
    watcher: Option<crate::asset::ConfigWatcher>,
    #[cfg(feature = "diagnostics")]
    frame_rate: crate::diag::FrameRateCounter,
}

impl WinitApp {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            fractal: Fractal::new(settings.config.clone()),
            settings,
            graphics: None,
            camera: Camera::default(),
            time: Time::new(),
            paused: false,
            orbit_angle: 0.0,
            #[cfg(feature = "hot-reload")]
            watcher: None,
            #[cfg(feature = "diagnostics")]
            frame_rate: crate::diag::FrameRateCounter::default(),
        }
    }

    /// Rebuild the fractal with `config`, activating it if it was not active.
    fn apply_config(&mut self, config: FractalConfig) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };
        let backend = &mut graphics.backend;
        match self.fractal.on_reconfigure(backend, config) {
            Ok(()) if !self.fractal.is_active() => {
                if let Err(e) = self.fractal.on_activate(backend) {
                    log::error!("Fractal activation failed: {e}");
                }
            }
            Ok(()) => {}
            Err(e) => log::error!("Fractal rebuild failed: {e}"),
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        let depth = match key {
            KeyCode::Escape => {
                event_loop.exit();
                return;
            }
            KeyCode::Space => {
                self.paused = !self.paused;
                log::info!("Animation {}", if self.paused { "paused" } else { "resumed" });
                return;
            }
            #[cfg(feature = "diagnostics")]
            KeyCode::KeyF => {
                use crate::diag::DisplayMode;
                let mode = match self.frame_rate.mode() {
                    DisplayMode::Fps => DisplayMode::Ms,
                    DisplayMode::Ms => DisplayMode::Fps,
                };
                self.frame_rate.set_mode(mode);
                return;
            }
            KeyCode::Digit1 => 1,
            KeyCode::Digit2 => 2,
            KeyCode::Digit3 => 3,
            KeyCode::Digit4 => 4,
            KeyCode::Digit5 => 5,
            KeyCode::Digit6 => 6,
            KeyCode::Digit7 => 7,
            KeyCode::Digit8 => 8,
            _ => return,
        };
        let config = self.fractal.config().clone().with_depth(depth);
        self.apply_config(config);
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        self.time.update();
        let dt = if self.paused { 0.0 } else { self.time.delta_secs() };

        #[cfg(feature = "hot-reload")]
        if let Some(config) = self.watcher.as_mut().and_then(|w| w.poll()) {
            self.apply_config(config);
        }

        #[cfg(feature = "diagnostics")]
        if let Some(report) = self.frame_rate.record(self.time.delta_secs()) {
            log::info!("{report} ({} instances)", self.fractal.stats().instances);
        }

        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        self.fractal
            .on_tick(&mut graphics.backend, dt, &self.settings.placement);

        let scale = self.settings.placement.uniform_scale();
        self.orbit_angle += self.settings.orbit_speed * dt;
        self.camera.orbit(
            self.settings.placement.translation + Vec3::new(0.0, scale, 0.0),
            6.0 * scale,
            1.5 * scale,
            self.orbit_angle,
        );
        graphics
            .backend
            .set_camera(&self.camera, graphics.gpu.aspect_ratio());

        match render_frame(&graphics.gpu, &mut graphics.backend, self.settings.clear_color) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                graphics.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory!");
                event_loop.exit();
            }
            Err(e) => {
                log::warn!("Surface error: {:?}", e);
            }
        }

        graphics.window.request_redraw();
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.settings.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("Failed to create window"),
        );

        let gpu = GpuContext::new(window.clone());
        let mut backend = WgpuBackend::new(&gpu);
        backend.set_material_color(DEFAULT_MATERIAL, self.settings.base_color);

        if let Err(e) = self.fractal.on_activate(&mut backend) {
            log::error!("Fractal activation failed: {e}");
        }

        #[cfg(feature = "hot-reload")]
        if let Some(path) = &self.settings.config_path {
            match crate::asset::ConfigWatcher::new(path) {
                Ok(watcher) => {
                    if watcher.is_watching() {
                        log::info!("Hot-reloading fractal config '{}'", watcher.path().display());
                    }
                    self.watcher = Some(watcher);
                }
                Err(e) => log::warn!("Config hot-reload unavailable: {e}"),
            }
        }

        window.request_redraw();
        self.graphics = Some(Graphics {
            window,
            gpu,
            backend,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested, exiting.");
                if let Some(graphics) = self.graphics.as_mut() {
                    self.fractal.on_deactivate(&mut graphics.backend);
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(graphics) = self.graphics.as_mut() {
                    graphics.gpu.resize(size.width, size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.on_key(event_loop, key);
                    }
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {}
        }
    }
}
