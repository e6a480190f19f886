//! # Animator — Per-Tick Spin and Transform Propagation
//!
//! Every tick walks the tree root-to-leaf and recomputes every part's world
//! transform from its parent's value of the *same* tick. Nothing is cached
//! between ticks except `spin_angle`.
//!
//! ## Per-Tick Flow
//!
//! ```text
//! animate(tree, elapsed, placement)
//!   │
//!   ├─ spin_delta = 22.5°/s × elapsed
//!   │
//!   ├─ root: spin += delta
//!   │        world_rotation = placement.rotation × (rotation × spin)
//!   │        world_position = placement.translation
//!   │        matrix = TRS(world_position, world_rotation, object_scale)
//!   │
//!   └─ for level 1..depth (scale halves each level):
//!        pass 1 ── for each part i, parent = level[L-1][i / 5]
//!        │         spin += delta
//!        │         world_rotation = parent.world_rotation × (rotation × spin)
//!        │         world_position = parent.world_position
//!        │                        + parent.world_rotation × (1.5 × scale × direction)
//!        pass 2 ── matrix[i] = TRS(world_position, world_rotation, scale)
//! ```
//!
//! Level `L` only reads level `L - 1`, which has already been fully updated.
//! Parts on the same level never read each other, so the order inside a level
//! does not matter. The parent level is borrowed immutably while the child
//! level is written (`split_at_mut`), which keeps that property checked by
//! the compiler.
//!
//! Offsets are rotated by the parent's *world* rotation, not its local one:
//! a child swings with everything above it.

use super::part::FractalPart;
use super::tree::{FractalTree, parent_index};
use crate::math::Transform;

/// Spin rate of every part, in degrees per second.
pub const SPIN_DEGREES_PER_SECOND: f32 = 22.5;

/// Distance from a parent's center to its child's center, in units of the
/// child's scale.
pub const STEM_LENGTH: f32 = 1.5;

/// Instance scale of `level` for a fractal placed at `object_scale`.
pub fn level_scale(object_scale: f32, level: usize) -> f32 {
    object_scale * 0.5f32.powi(level as i32)
}

/// Advance the whole tree by `elapsed` seconds.
///
/// The tree must be allocated and built. The host lifecycle guarantees this;
/// an empty tree is left untouched.
pub fn animate(tree: &mut FractalTree, elapsed: f32, placement: &Transform) {
    debug_assert!(tree.is_allocated(), "animate called on an unallocated tree");
    let levels = tree.levels_mut();
    if levels.is_empty() {
        return;
    }

    let spin_delta = SPIN_DEGREES_PER_SECOND * elapsed;
    let object_scale = placement.uniform_scale();

    {
        let root_level = &mut levels[0];
        let root = &mut root_level.parts[0];
        advance_root(root, spin_delta, placement);
        root_level.matrices[0] = root.matrix(object_scale);
    }

    let mut scale = object_scale;
    for l in 1..levels.len() {
        scale *= 0.5;

        let (done, rest) = levels.split_at_mut(l);
        let parents = &done[l - 1].parts;
        let level = &mut rest[0];

        for (index, part) in level.parts.iter_mut().enumerate() {
            advance_child(part, &parents[parent_index(index)], spin_delta, scale);
        }
        for (matrix, part) in level.matrices.iter_mut().zip(&level.parts) {
            *matrix = part.matrix(scale);
        }
    }
}

fn advance_root(root: &mut FractalPart, spin_delta: f32, placement: &Transform) {
    root.spin_angle += spin_delta;
    root.world_rotation = placement.rotation * root.local_rotation();
    root.world_position = placement.translation;
}

fn advance_child(part: &mut FractalPart, parent: &FractalPart, spin_delta: f32, scale: f32) {
    part.spin_angle += spin_delta;
    part.world_rotation = parent.world_rotation * part.local_rotation();
    part.world_position =
        parent.world_position + parent.world_rotation * (STEM_LENGTH * scale * part.direction);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::builder::build;
    use crate::math::{Quat, Vec3};

    const EPS: f32 = 1e-4;

    fn built(depth: u32) -> FractalTree {
        let mut tree = FractalTree::new();
        tree.allocate(depth).unwrap();
        build(&mut tree);
        tree
    }

    #[test]
    fn single_level_one_second() {
        let mut tree = built(1);
        animate(&mut tree, 1.0, &Transform::IDENTITY);

        let root = tree.root();
        assert!((root.spin_angle - 22.5).abs() < EPS);
        assert_eq!(root.world_position, Vec3::ZERO);
        let expected = Quat::from_rotation_y(22.5f32.to_radians());
        assert!(root.world_rotation.abs_diff_eq(expected, EPS));

        let m = tree.level(0).matrices[0];
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        assert!((scale - Vec3::ONE).length() < EPS);
        assert!(rotation.abs_diff_eq(expected, EPS));
        assert!(translation.length() < EPS);
    }

    #[test]
    fn spin_accumulates_over_ticks() {
        let mut tree = built(3);
        let steps = [0.016, 0.033, 0.5, 0.0, 0.25];
        for dt in steps {
            animate(&mut tree, dt, &Transform::IDENTITY);
        }
        let expected = SPIN_DEGREES_PER_SECOND * steps.iter().sum::<f32>();
        for level in tree.levels() {
            for part in &level.parts {
                // Summation order differs, so allow float accumulation error.
                assert!((part.spin_angle - expected).abs() < 1e-3, "{} != {expected}", part.spin_angle);
            }
        }
    }

    #[test]
    fn scale_halves_per_level() {
        let mut tree = built(5);
        let placement = Transform::IDENTITY.with_scale(3.0);
        animate(&mut tree, 0.1, &placement);

        for (l, level) in tree.levels().iter().enumerate() {
            let expected = 3.0 * 0.5f32.powi(l as i32);
            assert_eq!(level_scale(3.0, l), expected);
            for m in &level.matrices {
                let (scale, _, _) = m.to_scale_rotation_translation();
                assert!((scale - Vec3::splat(expected)).length() < EPS, "level {l}: {scale:?}");
            }
        }
    }

    #[test]
    fn children_follow_parents_of_the_same_tick() {
        let mut tree = built(4);
        let placement = Transform::from_xyz(2.0, -1.0, 5.0)
            .with_rotation(Quat::from_rotation_x(0.3) * Quat::from_rotation_z(1.1))
            .with_scale(2.0);

        for _ in 0..3 {
            animate(&mut tree, 0.4, &placement);
        }

        for l in 1..tree.depth() {
            let scale = level_scale(2.0, l);
            let parents = &tree.level(l - 1).parts;
            for (i, part) in tree.level(l).parts.iter().enumerate() {
                let parent = &parents[i / 5];
                let expected_pos = parent.world_position
                    + parent.world_rotation * (STEM_LENGTH * scale * part.direction);
                let expected_rot = parent.world_rotation * (part.rotation * part.spin());
                assert!((part.world_position - expected_pos).length() < EPS, "level {l}, part {i}");
                assert!(part.world_rotation.abs_diff_eq(expected_rot, EPS), "level {l}, part {i}");
            }
        }
    }

    #[test]
    fn root_follows_placement() {
        let mut tree = built(2);
        let rotation = Quat::from_rotation_z(0.7);
        let placement = Transform::from_xyz(4.0, 0.0, -2.0).with_rotation(rotation);
        animate(&mut tree, 2.0, &placement);

        let root = tree.root();
        assert_eq!(root.world_position, Vec3::new(4.0, 0.0, -2.0));
        let expected = rotation * Quat::from_rotation_y(45f32.to_radians());
        assert!(root.world_rotation.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn up_child_sits_above_root() {
        let mut tree = built(2);
        animate(&mut tree, 1.0, &Transform::IDENTITY);

        // Spin about the up axis leaves the up offset unchanged.
        let up_child = &tree.level(1).parts[0];
        assert!((up_child.world_position - Vec3::new(0.0, 0.75, 0.0)).length() < EPS);

        // Every level-1 child sits one stem (1.5 × 0.5) away from the root.
        for part in &tree.level(1).parts {
            assert!((part.world_position.length() - 0.75).abs() < EPS);
        }
    }

    #[test]
    fn matrices_track_parts() {
        let mut tree = built(3);
        animate(&mut tree, 0.7, &Transform::IDENTITY);
        for (l, level) in tree.levels().iter().enumerate() {
            let scale = level_scale(1.0, l);
            for (part, m) in level.parts.iter().zip(&level.matrices) {
                assert!(m.abs_diff_eq(part.matrix(scale), EPS));
            }
        }
    }
}
