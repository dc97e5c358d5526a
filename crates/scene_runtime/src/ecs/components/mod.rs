//! Entity components
//!
//! Plain data components built from the blocks of an entity description.

pub mod collider;
pub mod rigidbody;
pub mod transform;

pub use collider::{BoundingVolume, ColliderComponent, ColliderDescription, ColliderType};
pub use rigidbody::{RigidbodyComponent, RigidbodyDescription};
pub use transform::{TransformComponent, TransformDescription};
