//! Perspective camera for the demo runner.
//!
//! The camera is a [`Transform`] plus projection parameters. Each frame its
//! view-projection matrix is written into the group 0 uniform.

use super::vertex::CameraUniform;
use crate::math::{Mat4, Transform, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub transform: Transform,
    /// Vertical field of view in degrees. Default: 45.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::from_xyz(0.0, 1.5, 6.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
            fov_y: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Projection × inverse camera transform.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.near, self.far);
        projection * self.transform.matrix().inverse()
    }

    /// Circle `target` at `radius` and `height`, `angle` radians around +Y.
    pub fn orbit(&mut self, target: Vec3, radius: f32, height: f32, angle: f32) {
        let eye = target + Vec3::new(angle.sin() * radius, height, angle.cos() * radius);
        self.transform = Transform::from_xyz(eye.x, eye.y, eye.z).looking_at(target, Vec3::Y);
    }

    pub(crate) fn uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj(aspect).to_cols_array_2d(),
            camera_pos: self.transform.translation.to_array(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_center() {
        let target = Vec3::new(0.0, 1.0, 0.0);
        let mut camera = Camera::default();
        camera.orbit(target, 5.0, 2.0, 0.7);

        let clip = camera.view_proj(16.0 / 9.0) * target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4, "ndc {ndc}");
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn uniform_carries_eye_position() {
        let mut camera = Camera::default();
        camera.orbit(Vec3::ZERO, 4.0, 0.0, 0.0);
        let uniform = camera.uniform(1.0);
        let eye = Vec3::from_array(uniform.camera_pos);
        assert!((eye - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
    }
}
