//! Populates a freshly allocated [`FractalTree`] with its fixed part geometry.
//!
//! Levels are built top-down so the root exists before anything reads it.
//! Descriptor assignment depends only on an index's slot in its sibling group,
//! so building is deterministic: the same depth always yields the same parts.

use super::descriptor::CHILD_COUNT;
use super::part::FractalPart;
use super::tree::FractalTree;

/// Write the root: slot 0 (up, identity), at rest.
pub fn build_root(tree: &mut FractalTree) {
    tree.level_mut(0).parts[0] = FractalPart::new(0);
}

/// Fill level `level` (≥ 1) group by group, slot 0..5 in table order.
pub fn build_level(tree: &mut FractalTree, level: usize) {
    debug_assert!(level >= 1, "level 0 is built by build_root");
    let parts = &mut tree.level_mut(level).parts;
    for group in parts.chunks_exact_mut(CHILD_COUNT) {
        for (child_index, part) in group.iter_mut().enumerate() {
            *part = FractalPart::new(child_index);
        }
    }
}

/// Build every level of an allocated tree, root first.
pub fn build(tree: &mut FractalTree) {
    if !tree.is_allocated() {
        return;
    }
    build_root(tree);
    for level in 1..tree.depth() {
        build_level(tree, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::descriptor::PART_DESCRIPTORS;
    use crate::math::{Quat, Vec3};

    fn built(depth: u32) -> FractalTree {
        let mut tree = FractalTree::new();
        tree.allocate(depth).unwrap();
        build(&mut tree);
        tree
    }

    #[test]
    fn root_is_up_and_at_rest() {
        let tree = built(1);
        let root = tree.root();
        assert_eq!(root.direction, Vec3::Y);
        assert_eq!(root.rotation, Quat::IDENTITY);
        assert_eq!(root.spin_angle, 0.0);
        assert_eq!(root.world_position, Vec3::ZERO);
        assert_eq!(root.world_rotation, Quat::IDENTITY);
    }

    #[test]
    fn descriptors_follow_sibling_slot() {
        let tree = built(5);
        for (l, level) in tree.levels().iter().enumerate().skip(1) {
            for (i, part) in level.parts.iter().enumerate() {
                let d = PART_DESCRIPTORS[i % 5];
                assert_eq!(part.direction, d.direction, "level {l}, part {i}");
                assert_eq!(part.rotation, d.rotation, "level {l}, part {i}");
            }
        }
    }

    #[test]
    fn rebuild_after_release_is_identical() {
        let mut tree = built(4);
        let first: Vec<_> = tree
            .levels()
            .iter()
            .flat_map(|l| l.parts.iter().map(|p| (p.direction, p.rotation)))
            .collect();

        tree.release();
        tree.allocate(4).unwrap();
        build(&mut tree);

        let second: Vec<_> = tree
            .levels()
            .iter()
            .flat_map(|l| l.parts.iter().map(|p| (p.direction, p.rotation)))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn build_on_unallocated_tree_is_noop() {
        let mut tree = FractalTree::new();
        build(&mut tree);
        assert!(!tree.is_allocated());
    }
}
