//! Scene entities and their components
//!
//! An [`Entity`] is a named bundle of components. Entities with a rigidbody
//! are actors; entities with an AI state machine are driven by the AI phases.

pub mod components;
pub mod entity;

pub use components::{ColliderComponent, ColliderType, RigidbodyComponent, TransformComponent};
pub use entity::{Entity, EntityError};
