//! Camera component
//!
//! Projection parameters live here; the eye position is the entity's
//! transform and the scene keeps `target` pointed at the player.

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4, Point3, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraComponent {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Viewport width / height
    pub aspect: f32,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
    /// Point in world space to look at
    pub target: Vec3,
    /// Up vector (typically +Y)
    pub up: Vec3,
}

impl Component for CameraComponent {}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 500.0,
            target: Vec3::zeros(),
            up: Vec3::y(),
        }
    }
}

impl CameraComponent {
    /// Create a perspective camera
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            ..Default::default()
        }
    }

    /// Right-handed view matrix for a camera at `eye`
    pub fn view_matrix(&self, eye: &Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(*eye), &Point3::from(self.target), &self.up)
    }

    /// Perspective projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, utils::deg_to_rad(self.fov_degrees), self.near, self.far)
    }

    /// Projection * view
    pub fn view_projection(&self, eye: &Vec3) -> Mat4 {
        self.projection_matrix() * self.view_matrix(eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = CameraComponent::default();
        camera.target = Vec3::new(0.0, 1.0, 0.0);
        let eye = Vec3::new(0.0, 5.0, 10.0);

        let clip = camera.view_projection(&eye) * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        assert!(clip.w > 0.0);
    }
}
