//! Headless fractal.
//!
//! Drives a depth-6 fractal for one simulated second at 60 Hz without a
//! window or GPU, then prints what the renderer would have received.

use std::time::Duration;

use greina::prelude::*;

fn main() {
    env_logger::init();

    let mut backend = HeadlessBackend::new();
    let mesh = backend.add_mesh(vec![
        SubMesh { index_start: 0, index_count: 36, base_vertex: 0 },
        SubMesh { index_start: 36, index_count: 3072, base_vertex: 24 },
    ]);

    let mut fractal = Fractal::new(FractalConfig::default().with_depth(6).with_mesh(mesh, 1));
    if let Err(e) = fractal.on_activate(&mut backend) {
        eprintln!("activation failed: {e}");
        std::process::exit(1);
    }

    let placement = Transform::from_xyz(0.0, 0.0, 0.0);
    let mut time = Time::new();
    for _ in 0..60 {
        time.advance(Duration::from_secs_f64(1.0 / 60.0));
        backend.take_draws();
        fractal.on_tick(&mut backend, time.delta_secs(), &placement);
    }

    let stats = fractal.stats();
    println!(
        "{} frames, {:.2}s: {} levels, {} instances, {} draws per frame",
        time.frame_count(),
        time.elapsed_secs(),
        stats.levels,
        stats.instances,
        stats.draw_calls
    );
    for (level, draw) in backend.draws().iter().enumerate() {
        if let Some(args) = backend.draw_args(draw) {
            println!(
                "level {level}: {} instances × {} indices, args @ {} bytes",
                args.instance_count, args.index_count, draw.args_offset
            );
        }
    }

    if let Some(tree) = fractal.tree() {
        let root = tree.root();
        println!("root spin {:.2}°, rotation {:?}", root.spin_angle, root.world_rotation);
    }

    fractal.on_deactivate(&mut backend);
    println!("live buffers after deactivate: {}", backend.live_buffers());
}
