//! Transform component
//!
//! Pure data component: location, rotation and scale in world space.

use serde::Deserialize;

use crate::foundation::math::{utils, Mat4, Quat, Vec3};

/// Spatial transformation of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World space position
    pub position: Vec3,

    /// World space rotation quaternion
    pub rotation: Quat,

    /// World space scale factors
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation from Euler angles in degrees
    pub fn with_rotation_degrees(mut self, angles: Vec3) -> Self {
        self.rotation = utils::quat_from_euler_degrees(angles);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// `transform` block of an entity description
///
/// Rotation is given as XYZ Euler angles in degrees.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformDescription {
    /// Position
    pub location: [f32; 3],
    /// Euler angles in degrees
    pub rotation: [f32; 3],
    /// Scale factors
    pub scale: [f32; 3],
}

impl Default for TransformDescription {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl From<TransformDescription> for TransformComponent {
    fn from(description: TransformDescription) -> Self {
        Self::from_position(Vec3::from(description.location))
            .with_rotation_degrees(Vec3::from(description.rotation))
            .with_scale(Vec3::from(description.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_defaults_to_identity() {
        let description: TransformDescription = serde_json::from_value(json!({})).unwrap();
        let transform = TransformComponent::from(description);
        assert_eq!(transform, TransformComponent::identity());
    }

    #[test]
    fn test_matrix_translation() {
        let description: TransformDescription = serde_json::from_value(json!({
            "location": [1.0, 2.0, 3.0],
            "scale": [2.0, 2.0, 2.0]
        }))
        .unwrap();
        let matrix = TransformComponent::from(description).to_matrix();
        assert_relative_eq!(matrix[(0, 3)], 1.0);
        assert_relative_eq!(matrix[(1, 3)], 2.0);
        assert_relative_eq!(matrix[(2, 3)], 3.0);
        assert_relative_eq!(matrix[(0, 0)], 2.0);
    }

    #[test]
    fn test_rotation_degrees() {
        let transform = TransformComponent::identity().with_rotation_degrees(Vec3::new(0.0, 0.0, 90.0));
        let rotated = transform.rotation * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-5);
    }
}
