//! Fractal configuration.
//!
//! [`FractalConfig`] is validated when the fractal is activated. It can be
//! read from JSON, which is also the format the hot-reload watcher
//! ([`ConfigWatcher`](crate::asset::ConfigWatcher)) picks up:
//!
//! ```json
//! { "depth": 6, "mesh": 0, "material": 0, "submesh_index": 1 }
//! ```
//!
//! Missing fields take their defaults. Changing any field of an active
//! fractal rebuilds it from scratch.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FractalError, Result};
use crate::fractal::tree::validate_depth;
use crate::render::{MaterialHandle, MeshHandle, RenderBackend};

/// Default number of levels.
pub const DEFAULT_DEPTH: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    /// Number of levels, `1..=8`.
    pub depth: u32,
    /// Mesh instanced on every level. `None` draws nothing.
    pub mesh: Option<MeshHandle>,
    pub material: Option<MaterialHandle>,
    /// Which sub-mesh of `mesh` to draw.
    pub submesh_index: usize,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            mesh: None,
            material: None,
            submesh_index: 0,
        }
    }
}

impl FractalConfig {
    /// Return a copy with the given depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Return a copy bound to `mesh`, drawing sub-mesh `submesh_index`.
    pub fn with_mesh(mut self, mesh: MeshHandle, submesh_index: usize) -> Self {
        self.mesh = Some(mesh);
        self.submesh_index = submesh_index;
        self
    }

    pub fn with_material(mut self, material: MaterialHandle) -> Self {
        self.material = Some(material);
        self
    }

    /// Checks that need no backend: the depth range.
    pub fn validate(&self) -> Result<()> {
        validate_depth(self.depth)
    }

    /// Full activation-time validation against the backend that will draw.
    pub fn validate_for(&self, backend: &dyn RenderBackend) -> Result<()> {
        self.validate()?;
        if let Some(mesh) = self.mesh {
            let available = backend.submesh_count(mesh);
            if self.submesh_index >= available {
                return Err(FractalError::InvalidConfiguration(format!(
                    "submesh {} requested but {mesh:?} has {available}",
                    self.submesh_index
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FractalError::ConfigLoad(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FractalError::ConfigLoad(e.to_string()))
    }

    /// Read a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FractalError::ConfigLoad(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .map_err(|e| FractalError::ConfigLoad(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessBackend, SubMesh};

    #[test]
    fn missing_fields_take_defaults() {
        let config = FractalConfig::from_json(r#"{ "depth": 6 }"#).unwrap();
        assert_eq!(config.depth, 6);
        assert_eq!(config.mesh, None);
        assert_eq!(config.submesh_index, 0);
    }

    #[test]
    fn handles_read_as_indices() {
        let config =
            FractalConfig::from_json(r#"{ "mesh": 2, "material": 1, "submesh_index": 1 }"#).unwrap();
        assert_eq!(config.mesh, Some(MeshHandle(2)));
        assert_eq!(config.material, Some(MaterialHandle(1)));
        assert_eq!(config.depth, DEFAULT_DEPTH);
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        let err = FractalConfig::from_json("{ depth: ").unwrap_err();
        assert!(matches!(err, FractalError::ConfigLoad(_)));
    }

    #[test]
    fn depth_range_is_validated() {
        assert!(FractalConfig::default().with_depth(1).validate().is_ok());
        assert!(FractalConfig::default().with_depth(8).validate().is_ok());
        for depth in [0, 9] {
            let err = FractalConfig::default().with_depth(depth).validate().unwrap_err();
            assert!(matches!(err, FractalError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn submesh_must_exist_on_bound_mesh() {
        let mut backend = HeadlessBackend::new();
        let mesh = backend.add_mesh(vec![SubMesh { index_start: 0, index_count: 6, base_vertex: 0 }]);

        let ok = FractalConfig::default().with_mesh(mesh, 0);
        assert!(ok.validate_for(&backend).is_ok());

        let bad = FractalConfig::default().with_mesh(mesh, 1);
        let err = bad.validate_for(&backend).unwrap_err();
        assert!(matches!(err, FractalError::InvalidConfiguration(_)));

        // Without a mesh the sub-mesh index is not checked.
        let unbound = FractalConfig { submesh_index: 4, ..FractalConfig::default() };
        assert!(unbound.validate_for(&backend).is_ok());
    }

    #[test]
    fn save_then_load_from_disk() {
        let path = std::env::temp_dir().join(format!("greina-config-{}.json", std::process::id()));
        let config = FractalConfig::default()
            .with_depth(7)
            .with_mesh(MeshHandle(0), 1)
            .with_material(MaterialHandle(0));
        config.save(&path).unwrap();
        let loaded = FractalConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = FractalConfig::load("/nonexistent/greina.json").unwrap_err();
        assert!(matches!(err, FractalError::ConfigLoad(_)));
    }
}
