//! Rigidbody component
//!
//! Entities carrying a rigidbody are the scene's actors. Only the state is
//! stored here; force integration belongs to the physics phases.

use serde::Deserialize;

use crate::assets::DescriptionError;
use crate::foundation::math::Vec3;

/// Physical body state
#[derive(Debug, Clone, PartialEq)]
pub struct RigidbodyComponent {
    /// Apply displacement and rotational forces?
    pub active: bool,
    /// Mass (kg)
    pub mass: f32,
    /// Velocity (m / s)
    pub velocity: Vec3,
    /// Acceleration (m / s^2)
    pub acceleration: Vec3,
}

impl RigidbodyComponent {
    /// Linear momentum (kg * m / s)
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }
}

impl Default for RigidbodyComponent {
    fn default() -> Self {
        Self {
            active: true,
            mass: 1.0,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
        }
    }
}

/// `rigidbody` block of an entity description
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RigidbodyDescription {
    /// Whether the body is simulated
    pub active: bool,
    /// Mass in kilograms, must be positive
    pub mass: f32,
    /// Initial velocity
    pub velocity: [f32; 3],
    /// Initial acceleration
    pub acceleration: [f32; 3],
}

impl Default for RigidbodyDescription {
    fn default() -> Self {
        Self {
            active: true,
            mass: 1.0,
            velocity: [0.0; 3],
            acceleration: [0.0; 3],
        }
    }
}

impl TryFrom<RigidbodyDescription> for RigidbodyComponent {
    type Error = DescriptionError;

    fn try_from(description: RigidbodyDescription) -> Result<Self, Self::Error> {
        if !(description.mass.is_finite() && description.mass > 0.0) {
            return Err(DescriptionError::Invalid {
                field: "mass".to_string(),
                reason: format!("expected a positive mass, got {}", description.mass),
            });
        }
        Ok(Self {
            active: description.active,
            mass: description.mass,
            velocity: Vec3::from(description.velocity),
            acceleration: Vec3::from(description.acceleration),
        })
    }
}
