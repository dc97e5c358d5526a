//! Point lights parsed from the scene description's `lights` array

use serde::Deserialize;

use crate::assets::DescriptionError;
use crate::foundation::math::Vec3;

/// Point light
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Name, unique within a scene
    pub name: String,
    /// Linear RGB colour
    pub color: Vec3,
    /// World space position
    pub location: Vec3,
}

impl Light {
    /// Create a light
    pub fn new(name: impl Into<String>, color: Vec3, location: Vec3) -> Self {
        Self {
            name: name.into(),
            color,
            location,
        }
    }
}

/// One light object of a scene description
///
/// ```json
/// { "name": "sun", "color": [1, 0.9, 0.8], "location": [0, 10, 0] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LightDescription {
    /// Light name
    pub name: String,
    /// Colour, defaults to white
    #[serde(default = "white")]
    pub color: [f32; 3],
    /// Position
    #[serde(default)]
    pub location: [f32; 3],
}

fn white() -> [f32; 3] {
    [1.0; 3]
}

impl TryFrom<LightDescription> for Light {
    type Error = DescriptionError;

    fn try_from(description: LightDescription) -> Result<Self, Self::Error> {
        if description.name.is_empty() {
            return Err(DescriptionError::Invalid {
                field: "name".to_string(),
                reason: "light name must not be empty".to_string(),
            });
        }
        if description.color.iter().any(|channel| *channel < 0.0) {
            return Err(DescriptionError::Invalid {
                field: "color".to_string(),
                reason: format!("negative channel in {:?}", description.color),
            });
        }
        Ok(Self::new(
            description.name,
            Vec3::from(description.color),
            Vec3::from(description.location),
        ))
    }
}
