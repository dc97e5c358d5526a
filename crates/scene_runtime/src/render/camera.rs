//! # Scene cameras
//!
//! Cameras are parsed from the scene description's `cameras` entry and stored
//! by name in the [`Scene`](crate::scene::Scene). Matrix math is
//! library-agnostic; the renderer applies its own clip-space conventions.
//!
//! ## Coordinate System
//! Right-handed, Y-up view space. The camera looks from `position` towards
//! `target`.

use nalgebra::Point3;
use serde::Deserialize;

use crate::assets::DescriptionError;
use crate::foundation::math::{utils, Mat4, Vec3};

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Name, unique within a scene
    pub name: String,

    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `name` - Camera name
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(
        name: impl Into<String>,
        position: Vec3,
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Point the camera at `target` with the given up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera \"{}\" look_at updated - target: {:?}, up: {:?}", self.name, target, up);
    }

    /// World to view space matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        )
    }

    /// View to clip space perspective matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Combined projection * view matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Check the camera's parameters
    pub fn validate(&self) -> Result<(), DescriptionError> {
        let invalid = |field: &str, reason: String| {
            Err(DescriptionError::Invalid {
                field: field.to_string(),
                reason,
            })
        };

        if self.name.is_empty() {
            return invalid("name", "camera name must not be empty".to_string());
        }
        if !(self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return invalid("fov", format!("expected (0, 180) degrees, got {}", utils::rad_to_deg(self.fov)));
        }
        if !(self.aspect > 0.0) {
            return invalid("aspect ratio", format!("expected a positive ratio, got {}", self.aspect));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return invalid(
                "near clip",
                format!("expected 0 < near < far, got near {} far {}", self.near, self.far),
            );
        }
        if (self.target - self.position).norm_squared() <= f32::EPSILON {
            return invalid("target", "target coincides with the camera location".to_string());
        }
        Ok(())
    }
}

/// One camera object of a scene description
///
/// ```json
/// { "name": "main", "location": [0, 2, 5], "target": [0, 0, 0], "fov": 75 }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CameraDescription {
    /// Camera name
    pub name: String,
    /// Camera position
    pub location: [f32; 3],
    /// Look-at point
    #[serde(default)]
    pub target: [f32; 3],
    /// Up vector
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// Near clipping plane
    #[serde(default = "default_near", rename = "near clip")]
    pub near: f32,
    /// Far clipping plane
    #[serde(default = "default_far", rename = "far clip")]
    pub far: f32,
    /// Width / height
    #[serde(default = "default_aspect", rename = "aspect ratio")]
    pub aspect: f32,
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f32 {
    90.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

fn default_aspect() -> f32 {
    16.0 / 9.0
}

impl TryFrom<CameraDescription> for Camera {
    type Error = DescriptionError;

    fn try_from(description: CameraDescription) -> Result<Self, Self::Error> {
        let mut camera = Self::perspective(
            description.name,
            Vec3::from(description.location),
            description.fov,
            description.aspect,
            description.near,
            description.far,
        );
        camera.look_at(Vec3::from(description.target), Vec3::from(description.up));
        camera.validate()?;
        Ok(camera)
    }
}
