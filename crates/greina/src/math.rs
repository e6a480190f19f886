//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The [`Transform`] type is the fractal's placement in
//! world space: the host owns it and hands it to
//! [`Fractal::on_tick`](crate::fractal::Fractal::on_tick) every frame.

pub use glam::{Mat4, Quat, Vec3, Vec4};

/// A 3D transform: position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Create a transform that looks at a target point from the current position.
    ///
    /// Useful for camera placement: `Transform::from_xyz(0, 5, 10).looking_at(Vec3::ZERO, Vec3::Y)`
    /// creates a camera at (0,5,10) looking toward the origin.
    pub fn looking_at(mut self, target: Vec3, up: Vec3) -> Self {
        let look = Mat4::look_at_rh(self.translation, target, up);
        let (_, rot, _) = look.inverse().to_scale_rotation_translation();
        self.rotation = rot;
        self
    }

    /// Return a copy with the given rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// The scalar scale the fractal is built at.
    ///
    /// Fractal instances are scaled isotropically, so only the X component is
    /// read. A non-uniform host scale is not propagated.
    pub fn uniform_scale(&self) -> f32 {
        self.scale.x
    }

    /// Compute the 4x4 model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_scale_reads_x_axis() {
        let t = Transform {
            scale: Vec3::new(2.0, 3.0, 4.0),
            ..Transform::IDENTITY
        };
        assert_eq!(t.uniform_scale(), 2.0);
        assert_eq!(Transform::IDENTITY.with_scale(0.5).uniform_scale(), 0.5);
    }

    #[test]
    fn looking_at_faces_target() {
        let t = Transform::from_xyz(0.0, 0.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y);
        // Cameras look down their local -Z.
        let forward = t.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-5, "got {forward:?}");
    }
}
