//! Math utilities and types
//!
//! Provides fundamental math types for 3D gameplay code. Everything is a thin
//! alias over `nalgebra` so the same vectors flow straight into rapier.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Quat, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Component-wise linear interpolation, `(1 - t) * a + t * b`
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a * (1.0 - t) + b * t
    }

    /// Build a rotation from per-axis angles in degrees (X = roll, Y = pitch, Z = yaw)
    pub fn quat_from_euler_degrees(degrees: &Vec3) -> Quat {
        Quat::from_euler_angles(
            deg_to_rad(degrees.x),
            deg_to_rad(degrees.y),
            deg_to_rad(degrees.z),
        )
    }

    /// Inverse of [`quat_from_euler_degrees`]
    pub fn euler_degrees_from_quat(rotation: &Quat) -> Vec3 {
        let (roll, pitch, yaw) = rotation.euler_angles();
        Vec3::new(rad_to_deg(roll), rad_to_deg(pitch), rad_to_deg(yaw))
    }

    /// Scaled axis-angle vector, the rotation form rapier builders accept
    pub fn axis_angle_from_euler_degrees(degrees: &Vec3) -> Vec3 {
        quat_from_euler_degrees(degrees).scaled_axis()
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_endpoints() {
        let a = Vec3::new(0.0, 1.0, 2.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_relative_eq!(lerp_vec3(&a, &b, 0.0), a);
        assert_relative_eq!(lerp_vec3(&a, &b, 1.0), b);
        assert_relative_eq!(lerp_vec3(&a, &b, 0.5), Vec3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(lerp(10.0, 20.0, 0.25), 12.5);
    }

    #[test]
    fn test_euler_degrees_round_trip() {
        let degrees = Vec3::new(10.0, 20.0, 30.0);
        let rotation = quat_from_euler_degrees(&degrees);
        assert_relative_eq!(euler_degrees_from_quat(&rotation), degrees, epsilon = 1e-3);
    }
}
