//! One node of the fractal.

use super::descriptor::descriptor_for;
use crate::math::{Mat4, Quat, Vec3};

/// A single fractal part.
///
/// `direction` and `rotation` are fixed at creation by the part's slot in its
/// sibling group. `spin_angle` grows every tick. The world fields are
/// overwritten every tick from the parent's freshly computed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalPart {
    /// Local branch direction, relative to the parent's frame.
    pub direction: Vec3,
    /// Local orientation offset, relative to the parent's frame.
    pub rotation: Quat,
    /// Accumulated spin about the local up axis, in degrees. Unbounded.
    pub spin_angle: f32,
    pub world_position: Vec3,
    pub world_rotation: Quat,
}

impl FractalPart {
    /// Create a part for slot `child_index` of a sibling group.
    pub fn new(child_index: usize) -> Self {
        let descriptor = descriptor_for(child_index);
        Self {
            direction: descriptor.direction,
            rotation: descriptor.rotation,
            spin_angle: 0.0,
            world_position: Vec3::ZERO,
            world_rotation: Quat::IDENTITY,
        }
    }

    /// Rotation by the current spin angle about the up axis.
    pub fn spin(&self) -> Quat {
        Quat::from_rotation_y(self.spin_angle.to_radians())
    }

    /// Local rotation followed by spin: `rotation ∘ spin(spin_angle)`.
    pub fn local_rotation(&self) -> Quat {
        self.rotation * self.spin()
    }

    /// Instance transform at the given uniform scale.
    pub fn matrix(&self, scale: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            self.world_rotation,
            self.world_position,
        )
    }
}

impl Default for FractalPart {
    fn default() -> Self {
        Self::new(0)
    }
}
