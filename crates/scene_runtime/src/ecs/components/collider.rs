//! Collider component
//!
//! Axis-aligned bounds plus a shape type taken from a fixed table of
//! names. [`ColliderType::TABLE`] is the only name mapping; descriptions
//! decode through it.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::assets::DescriptionError;
use crate::foundation::math::{utils, Vec3};

/// Collision shape types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ColliderType {
    /// Flat quad
    Quad,
    /// Oriented box
    Box,
    /// Sphere
    Sphere,
    /// Capsule
    Capsule,
    /// Cylinder
    Cylinder,
    /// Cone
    Cone,
    /// Convex hull
    ConvexHull,
}

impl ColliderType {
    /// Every collider type with its description name
    pub const TABLE: [(&'static str, Self); 7] = [
        ("quad", Self::Quad),
        ("box", Self::Box),
        ("sphere", Self::Sphere),
        ("capsule", Self::Capsule),
        ("cylinder", Self::Cylinder),
        ("cone", Self::Cone),
        ("convexhull", Self::ConvexHull),
    ];

    /// Name used in descriptions
    pub fn name(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("invalid", |(name, _)| name)
    }
}

impl FromStr for ColliderType {
    type Err = DescriptionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| DescriptionError::Invalid {
                field: "type".to_string(),
                reason: format!("unknown collider type \"{name}\""),
            })
    }
}

impl TryFrom<String> for ColliderType {
    type Error = DescriptionError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl fmt::Display for ColliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bounding volume derived from the collider's AABB
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    /// Center of the box
    pub center: Vec3,
    /// Half size along each axis
    pub half_extents: Vec3,
}

impl BoundingVolume {
    /// Build from min/max corners
    pub fn from_aabb(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Check whether two volumes overlap (touching counts)
    pub fn intersects(&self, other: &Self) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        utils::component_le(&delta, &reach)
    }
}

/// Collision shape with its axis-aligned bounds
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderComponent {
    /// Shape type
    pub collider_type: ColliderType,
    /// Minimum AABB corner
    pub aabb_min: Vec3,
    /// Maximum AABB corner
    pub aabb_max: Vec3,
    /// Volume derived from the AABB
    pub bounding_volume: BoundingVolume,
}

impl ColliderComponent {
    /// Create a collider, rejecting an inverted AABB
    pub fn new(collider_type: ColliderType, aabb_min: Vec3, aabb_max: Vec3) -> Result<Self, DescriptionError> {
        if !utils::component_le(&aabb_min, &aabb_max) {
            return Err(DescriptionError::Invalid {
                field: "min".to_string(),
                reason: format!(
                    "min {:?} exceeds max {:?} on at least one axis",
                    aabb_min.as_slice(),
                    aabb_max.as_slice()
                ),
            });
        }
        Ok(Self {
            collider_type,
            aabb_min,
            aabb_max,
            bounding_volume: BoundingVolume::from_aabb(aabb_min, aabb_max),
        })
    }
}

/// Collision/shape description
///
/// ```json
/// { "type": "box", "max": [1, 1, 1], "min": [-1, -1, -1] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ColliderDescription {
    /// Shape type name
    #[serde(rename = "type")]
    pub collider_type: ColliderType,
    /// Maximum AABB corner
    pub max: [f32; 3],
    /// Minimum AABB corner
    pub min: [f32; 3],
}

impl TryFrom<ColliderDescription> for ColliderComponent {
    type Error = DescriptionError;

    fn try_from(description: ColliderDescription) -> Result<Self, Self::Error> {
        Self::new(
            description.collider_type,
            Vec3::from(description.min),
            Vec3::from(description.max),
        )
    }
}
