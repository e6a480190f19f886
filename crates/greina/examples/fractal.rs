//! Windowed fractal.
//!
//! Loads `examples/assets/fractal.json` and watches it: edit the depth or
//! switch `submesh_index` between 0 (cube) and 1 (sphere) while running and
//! the fractal rebuilds. Keys `1`–`8` change the depth directly.

use std::path::PathBuf;

use greina::prelude::*;

fn main() {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("examples")
        .join("assets")
        .join("fractal.json");

    let config = FractalConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("{e}, using the default sphere fractal");
        FractalConfig::default().with_depth(6).with_mesh(mesh_primitives(), 1)
    });

    App::new(config)
        .set_title("greina — fractal")
        .with_placement(Transform::from_xyz(0.0, 0.0, 0.0).with_scale(1.0))
        .with_clear_color(ClearColor([0.05, 0.06, 0.1, 1.0]))
        .watch_config(config_path)
        .run();
}
