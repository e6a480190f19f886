//! # Fractal — Host Lifecycle Around the Tree and Its Draws
//!
//! A [`Fractal`] is driven by four hooks:
//!
//! ```text
//!              on_activate(backend)
//!   Inactive ─────────────────────────► Active { tree, feeder }
//!      ▲   validate config                │
//!      │   allocate tree + build          │ on_tick(backend, elapsed, placement)
//!      │   allocate GPU buffers           │   animate(tree) then feeder.submit
//!      │                                  │
//!      └──────────────────────────────────┘
//!              on_deactivate(backend)
//!
//!   on_reconfigure(backend, config) = on_deactivate + store config + on_activate
//! ```
//!
//! The tree and the feeder's buffers live and die together inside
//! `ActiveFractal`. Activation either produces both or neither: a rejected
//! configuration allocates nothing, and a failed buffer allocation releases
//! whatever the feeder had already created. Reconfiguration never resizes in
//! place; a depth change rebuilds every level from scratch.

pub mod animate;
pub mod builder;
pub mod descriptor;
pub mod part;
pub mod tree;

pub use animate::{SPIN_DEGREES_PER_SECOND, STEM_LENGTH, animate, level_scale};
pub use descriptor::{CHILD_COUNT, PART_DESCRIPTORS, PartDescriptor, descriptor_for};
pub use part::FractalPart;
pub use tree::{FractalTree, Level, MAX_DEPTH, MIN_DEPTH, level_len, parent_index};

use crate::config::FractalConfig;
use crate::error::{FractalError, Result};
use crate::math::Transform;
use crate::render::{RenderBackend, RenderFeeder, RenderStats};

/// The tree plus the GPU buffers mirroring it. Only exists while active.
#[derive(Debug)]
struct ActiveFractal {
    tree: FractalTree,
    feeder: RenderFeeder,
}

/// One fractal instance and its configuration.
#[derive(Debug, Default)]
pub struct Fractal {
    config: FractalConfig,
    active: Option<ActiveFractal>,
}

impl Fractal {
    pub fn new(config: FractalConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Validate the configuration, then build the tree and its buffers.
    ///
    /// Calling this on an active fractal is a no-op.
    pub fn on_activate(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        if self.active.is_some() {
            return Ok(());
        }
        self.config.validate_for(backend)?;

        let mut tree = FractalTree::new();
        tree.allocate(self.config.depth)?;
        builder::build(&mut tree);

        let feeder = RenderFeeder::allocate(backend, &tree, &self.config)?;

        if self.config.mesh.is_none() {
            log::warn!("{}", FractalError::MissingMeshBinding);
        }
        log::info!(
            "Fractal activated: depth {}, {} parts",
            tree.depth(),
            tree.total_parts()
        );

        self.active = Some(ActiveFractal { tree, feeder });
        Ok(())
    }

    /// Release the tree and every GPU buffer. Safe when already inactive.
    pub fn on_deactivate(&mut self, backend: &mut dyn RenderBackend) {
        let Some(ActiveFractal { mut tree, feeder }) = self.active.take() else {
            return;
        };
        feeder.release(backend);
        tree.release();
        log::info!("Fractal deactivated");
    }

    /// Replace the configuration.
    ///
    /// An active fractal is torn down and rebuilt with the new settings; if
    /// the rebuild fails it stays inactive and the error is returned. An
    /// inactive fractal just stores the config for the next activation.
    pub fn on_reconfigure(
        &mut self,
        backend: &mut dyn RenderBackend,
        config: FractalConfig,
    ) -> Result<()> {
        let was_active = self.is_active();
        self.on_deactivate(backend);
        self.config = config;
        if was_active {
            log::debug!("Rebuilding fractal with {:?}", self.config);
            self.on_activate(backend)?;
        }
        Ok(())
    }

    /// Advance the animation by `elapsed` seconds and submit this tick's draws.
    ///
    /// `placement` is the fractal's world transform; its X scale is the
    /// object scale. Does nothing while inactive.
    pub fn on_tick(&mut self, backend: &mut dyn RenderBackend, elapsed: f32, placement: &Transform) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        animate(&mut active.tree, elapsed, placement);
        active
            .feeder
            .submit(backend, &active.tree, placement.uniform_scale());
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The tree, while active.
    pub fn tree(&self) -> Option<&FractalTree> {
        self.active.as_ref().map(|a| &a.tree)
    }

    /// Counters from the last submitted tick; zero while inactive.
    pub fn stats(&self) -> RenderStats {
        self.active
            .as_ref()
            .map(|a| a.feeder.stats())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quat, Vec3};
    use crate::render::{DrawIndexedArgs, HeadlessBackend, MeshHandle, SubMesh};

    fn backend_with_cube() -> (HeadlessBackend, MeshHandle) {
        let mut backend = HeadlessBackend::new();
        let mesh = backend.add_mesh(vec![SubMesh {
            index_start: 0,
            index_count: 36,
            base_vertex: 0,
        }]);
        (backend, mesh)
    }

    #[test]
    fn depth_one_one_second_end_to_end() {
        let (mut backend, mesh) = backend_with_cube();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(1).with_mesh(mesh, 0));
        fractal.on_activate(&mut backend).unwrap();

        fractal.on_tick(&mut backend, 1.0, &Transform::IDENTITY);

        let root = fractal.tree().unwrap().root();
        assert!((root.spin_angle - 22.5).abs() < 1e-5);
        assert_eq!(root.world_position, Vec3::ZERO);
        let expected = Quat::from_rotation_y(22.5f32.to_radians());
        assert!(root.world_rotation.abs_diff_eq(expected, 1e-5));

        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(backend.draw_args(&draws[0]).unwrap().instance_count, 1);
    }

    #[test]
    fn depth_two_levels_and_parents() {
        let mut backend = HeadlessBackend::new();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(2));
        fractal.on_activate(&mut backend).unwrap();

        let tree = fractal.tree().unwrap();
        let counts: Vec<usize> = tree.levels().iter().map(Level::len).collect();
        assert_eq!(counts, vec![1, 5]);
        let parents: Vec<usize> = (0..5).map(parent_index).collect();
        assert_eq!(parents, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn invalid_depth_rejects_activation_without_allocating() {
        let mut backend = HeadlessBackend::new();
        for depth in [0, 9] {
            let mut fractal = Fractal::new(FractalConfig::default().with_depth(depth));
            let err = fractal.on_activate(&mut backend).unwrap_err();
            assert!(matches!(err, FractalError::InvalidConfiguration(_)));
            assert!(!fractal.is_active());
            assert_eq!(backend.live_buffers(), 0);
        }
    }

    #[test]
    fn invalid_submesh_rejects_activation() {
        let (mut backend, mesh) = backend_with_cube();
        let mut fractal = Fractal::new(FractalConfig::default().with_mesh(mesh, 3));
        let err = fractal.on_activate(&mut backend).unwrap_err();
        assert!(matches!(err, FractalError::InvalidConfiguration(_)));
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn exhaustion_leaves_fractal_inactive() {
        // The depth 8 leaf level needs 78 125 × 64 bytes.
        let mut backend = HeadlessBackend::new().with_buffer_limit(1 << 20);
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(8));

        let err = fractal.on_activate(&mut backend).unwrap_err();

        assert!(matches!(err, FractalError::ResourceExhaustion(_)));
        assert!(!fractal.is_active());
        assert_eq!(backend.live_buffers(), 0);

        // Ticking the failed fractal does nothing.
        fractal.on_tick(&mut backend, 0.1, &Transform::IDENTITY);
        assert!(backend.draws().is_empty());
    }

    #[test]
    fn missing_mesh_draws_zeroed_args_every_level() {
        let mut backend = HeadlessBackend::new();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(3));
        fractal.on_activate(&mut backend).unwrap();

        fractal.on_tick(&mut backend, 0.016, &Transform::IDENTITY);
        fractal.on_tick(&mut backend, 0.016, &Transform::IDENTITY);

        assert_eq!(backend.draws().len(), 6);
        for draw in backend.draws() {
            let args = backend.draw_args(draw).unwrap();
            assert_eq!(args, DrawIndexedArgs::ZERO);
        }
    }

    #[test]
    fn deactivate_releases_everything_and_is_repeatable() {
        let (mut backend, mesh) = backend_with_cube();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(4).with_mesh(mesh, 0));

        fractal.on_deactivate(&mut backend);
        fractal.on_activate(&mut backend).unwrap();
        assert_eq!(backend.live_buffers(), 5);

        fractal.on_deactivate(&mut backend);
        fractal.on_deactivate(&mut backend);
        assert!(!fractal.is_active());
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn activate_twice_keeps_one_set_of_buffers() {
        let mut backend = HeadlessBackend::new();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(2));
        fractal.on_activate(&mut backend).unwrap();
        fractal.on_activate(&mut backend).unwrap();
        assert_eq!(backend.live_buffers(), 3);
    }

    #[test]
    fn reconfigure_rebuilds_from_scratch() {
        let (mut backend, mesh) = backend_with_cube();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(3).with_mesh(mesh, 0));
        fractal.on_activate(&mut backend).unwrap();
        fractal.on_tick(&mut backend, 2.0, &Transform::IDENTITY);

        fractal
            .on_reconfigure(&mut backend, FractalConfig::default().with_depth(5).with_mesh(mesh, 0))
            .unwrap();

        let tree = fractal.tree().unwrap();
        assert_eq!(tree.depth(), 5);
        assert_eq!(tree.root().spin_angle, 0.0, "spin resets on rebuild");
        assert_eq!(backend.live_buffers(), 6);
        assert_eq!(fractal.config().depth, 5);
    }

    #[test]
    fn reconfigure_while_inactive_only_stores_config() {
        let mut backend = HeadlessBackend::new();
        let mut fractal = Fractal::default();
        fractal
            .on_reconfigure(&mut backend, FractalConfig::default().with_depth(6))
            .unwrap();
        assert!(!fractal.is_active());
        assert_eq!(fractal.config().depth, 6);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn failed_reconfigure_leaves_fractal_inactive() {
        let mut backend = HeadlessBackend::new();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(2));
        fractal.on_activate(&mut backend).unwrap();

        let err = fractal
            .on_reconfigure(&mut backend, FractalConfig::default().with_depth(12))
            .unwrap_err();

        assert!(matches!(err, FractalError::InvalidConfiguration(_)));
        assert!(!fractal.is_active());
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn rebuild_reproduces_identical_structure() {
        let mut backend = HeadlessBackend::new();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(4));
        fractal.on_activate(&mut backend).unwrap();
        let first: Vec<_> = fractal
            .tree()
            .unwrap()
            .levels()
            .iter()
            .flat_map(|l| l.parts.iter().map(|p| (p.direction, p.rotation)))
            .collect();

        fractal.on_deactivate(&mut backend);
        fractal.on_activate(&mut backend).unwrap();
        let second: Vec<_> = fractal
            .tree()
            .unwrap()
            .levels()
            .iter()
            .flat_map(|l| l.parts.iter().map(|p| (p.direction, p.rotation)))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn stats_track_last_tick() {
        let (mut backend, mesh) = backend_with_cube();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(3).with_mesh(mesh, 0));
        assert_eq!(fractal.stats(), RenderStats::default());

        fractal.on_activate(&mut backend).unwrap();
        fractal.on_tick(&mut backend, 0.1, &Transform::IDENTITY);
        let stats = fractal.stats();
        assert_eq!(stats.draw_calls, 3);
        assert_eq!(stats.instances, 1 + 5 + 25);
    }

    #[test]
    fn placement_scale_drives_bounds() {
        let (mut backend, mesh) = backend_with_cube();
        let mut fractal = Fractal::new(FractalConfig::default().with_depth(2).with_mesh(mesh, 0));
        fractal.on_activate(&mut backend).unwrap();

        let placement = Transform::from_xyz(1.0, 2.0, 3.0).with_scale(0.5);
        fractal.on_tick(&mut backend, 0.1, &placement);

        for draw in backend.draws() {
            assert_eq!(draw.bounds.center, Vec3::new(1.0, 2.0, 3.0));
            assert_eq!(draw.bounds.size, Vec3::splat(1.5));
        }
    }
}
