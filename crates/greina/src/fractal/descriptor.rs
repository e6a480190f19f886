//! # Part Descriptors — The Five Branch Slots
//!
//! Every sibling group has five members. The member's position inside the
//! group (0–4) picks its fixed local direction and rotation from this table:
//!
//! ```text
//!  slot │ direction │ rotation
//!  ─────┼───────────┼──────────────────────
//!   0   │ +Y (up)   │ identity
//!   1   │ +X        │ -90° about Z
//!   2   │ -X        │ +90° about Z
//!   3   │ +Z        │ +90° about X
//!   4   │ -Z        │ -90° about X
//! ```
//!
//! Each tilt rotates the up axis onto its slot's direction, so a child's own
//! children keep growing "outward" from it.
//!
//! The table is `const` data shared by every fractal. Nothing writes to it.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::math::{Quat, Vec3};

/// Number of children per part, and the size of every sibling group.
pub const CHILD_COUNT: usize = 5;

/// Fixed local geometry for one sibling slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartDescriptor {
    pub direction: Vec3,
    pub rotation: Quat,
}

/// The descriptor table, indexed by position within a sibling group.
pub const PART_DESCRIPTORS: [PartDescriptor; CHILD_COUNT] = [
    PartDescriptor {
        direction: Vec3::Y,
        rotation: Quat::IDENTITY,
    },
    PartDescriptor {
        direction: Vec3::X,
        rotation: Quat::from_xyzw(0.0, 0.0, -FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    },
    PartDescriptor {
        direction: Vec3::NEG_X,
        rotation: Quat::from_xyzw(0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    },
    PartDescriptor {
        direction: Vec3::Z,
        rotation: Quat::from_xyzw(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2),
    },
    PartDescriptor {
        direction: Vec3::NEG_Z,
        rotation: Quat::from_xyzw(-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2),
    },
];

/// Descriptor for a part at `index` within its level.
pub fn descriptor_for(index: usize) -> PartDescriptor {
    PART_DESCRIPTORS[index % CHILD_COUNT]
}
