//! Transform component
//!
//! Position, per-axis rotation in degrees and scale. For entities with a
//! non-static rigid body the scene overwrites position and rotation from the
//! simulation every frame; the body is authoritative.

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World-space placement of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformComponent {
    /// World space position (Y-up right-handed)
    pub position: Vec3,

    /// Rotation in degrees about X, Y and Z
    pub rotation: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation in degrees
    pub fn with_rotation_degrees(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a unit quaternion
    pub fn orientation(&self) -> Quat {
        utils::quat_from_euler_degrees(&self.rotation)
    }

    /// Overwrite the rotation from a unit quaternion
    pub fn set_orientation(&mut self, orientation: &Quat) {
        self.rotation = utils::euler_degrees_from_quat(orientation);
    }

    /// Model matrix, scale then rotate then translate
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.orientation().to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_applies_scale_rotation_translation() {
        let transform = TransformComponent::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation_degrees(Vec3::new(0.0, 90.0, 0.0))
            .with_uniform_scale(2.0);

        let moved = transform.to_matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        // +X scaled to 2, rotated 90 degrees about Y onto -Z, then translated
        assert_relative_eq!(moved, Vec4::new(1.0, 2.0, 1.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orientation_round_trip() {
        let mut transform = TransformComponent::default();
        let rotation = utils::quat_from_euler_degrees(&Vec3::new(0.0, 0.0, 45.0));
        transform.set_orientation(&rotation);
        assert_relative_eq!(transform.rotation, Vec3::new(0.0, 0.0, 45.0), epsilon = 1e-4);
    }
}
