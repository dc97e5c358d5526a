//! Math utilities and types
//!
//! Thin aliases over `nalgebra` shared by the component and camera types.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

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

    /// Build a rotation from XYZ Euler angles given in degrees
    pub fn quat_from_euler_degrees(angles: Vec3) -> Quat {
        Quat::from_euler_angles(
            deg_to_rad(angles.x),
            deg_to_rad(angles.y),
            deg_to_rad(angles.z),
        )
    }

    /// True when every component of `a` is less than or equal to the matching one in `b`
    pub fn component_le(a: &Vec3, b: &Vec3) -> bool {
        a.x <= b.x && a.y <= b.y && a.z <= b.z
    }
}
