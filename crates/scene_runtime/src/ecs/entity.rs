//! Entity implementation

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use thiserror::Error;

use super::components::{
    ColliderComponent, ColliderDescription, RigidbodyComponent, RigidbodyDescription, TransformComponent,
    TransformDescription,
};
use crate::ai::{self, AIStateMachine, AiCache, AiDescription, AiError};
use crate::assets::{description, DescriptionError};

/// Entity construction errors
#[derive(Error, Debug)]
pub enum EntityError {
    /// The entity description is malformed
    #[error("invalid entity description: {0}")]
    Description(#[from] DescriptionError),

    /// The entity's AI block could not be built
    #[error("invalid AI block: {0}")]
    Ai(#[from] AiError),
}

/// Named bundle of components
///
/// The AI state machine sits behind its own mutex so that AI callbacks,
/// which receive `&Entity`, can still switch the entity's state.
pub struct Entity {
    name: String,
    transform: TransformComponent,
    rigidbody: Option<RigidbodyComponent>,
    collider: Option<ColliderComponent>,
    ai: Option<Mutex<AIStateMachine>>,
}

impl Entity {
    /// Create an entity with an identity transform and no other components
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: TransformComponent::identity(),
            rigidbody: None,
            collider: None,
            ai: None,
        }
    }

    /// Builder pattern: Set transform
    pub fn with_transform(mut self, transform: TransformComponent) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: Attach a rigidbody, making the entity an actor
    pub fn with_rigidbody(mut self, rigidbody: RigidbodyComponent) -> Self {
        self.rigidbody = Some(rigidbody);
        self
    }

    /// Builder pattern: Attach a collider
    pub fn with_collider(mut self, collider: ColliderComponent) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Builder pattern: Attach an entity-owned AI state machine
    pub fn with_ai(mut self, ai: AIStateMachine) -> Self {
        self.ai = Some(Mutex::new(ai));
        self
    }

    /// Build an entity from its description
    ///
    /// ```json
    /// {
    ///     "name": "guard 1",
    ///     "transform": { "location": [0, 0, 0], "rotation": [0, 90, 0], "scale": [1, 1, 1] },
    ///     "rigidbody": { "mass": 80 },
    ///     "collider": { "type": "capsule", "max": [0.5, 2, 0.5], "min": [-0.5, 0, -0.5] },
    ///     "ai": { "name": "Guard", "states": ["idle", "alert"], "initial state": "idle" }
    /// }
    /// ```
    ///
    /// Every block but `name` is optional. A string in place of the whole
    /// description, or of the `ai` block, is loaded as a path. AI templates
    /// are shared through `ai_cache`; the entity receives its own clone.
    pub fn from_description(value: &Value, ai_cache: &AiCache) -> Result<Self, EntityError> {
        let resolved = description::resolve(value, "entity")?;
        let object = description::as_object(&resolved, "entity")?;
        let mut entity = Self::new(description::required_str(object, "name")?);

        if let Some(transform) = object.get("transform") {
            let transform: TransformDescription = description::decode(transform, "transform")?;
            entity.transform = transform.into();
        }

        if let Some(rigidbody) = object.get("rigidbody") {
            let rigidbody: RigidbodyDescription = description::decode(rigidbody, "rigidbody")?;
            entity.rigidbody = Some(rigidbody.try_into()?);
        }

        if let Some(collider) = object.get("collider") {
            let collider: ColliderDescription = description::decode(collider, "collider")?;
            entity.collider = Some(collider.try_into()?);
        }

        if let Some(ai_block) = object.get("ai") {
            let ai_description = AiDescription::from_value(ai_block)?;
            let (ai, was_cached) = ai::instantiate(ai_cache, &ai_description)?;
            log::trace!(
                "Entity \"{}\" uses AI \"{}\" ({})",
                entity.name,
                ai.name(),
                if was_cached { "cached" } else { "new template" }
            );
            entity.ai = Some(Mutex::new(ai));
        }

        Ok(entity)
    }

    /// Entity name, unique within a scene
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spatial transform
    pub fn transform(&self) -> &TransformComponent {
        &self.transform
    }

    /// Physics body, if any
    pub fn rigidbody(&self) -> Option<&RigidbodyComponent> {
        self.rigidbody.as_ref()
    }

    /// Collision shape, if any
    pub fn collider(&self) -> Option<&ColliderComponent> {
        self.collider.as_ref()
    }

    /// Does the entity carry a rigidbody?
    pub fn is_actor(&self) -> bool {
        self.rigidbody.is_some()
    }

    /// Does the entity carry an AI state machine?
    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    /// Run `f` against the entity's AI under its lock
    ///
    /// Returns `None` for entities without AI. The lock is released before
    /// returning, so `f` must not invoke AI callbacks itself.
    pub fn map_ai<R>(&self, f: impl FnOnce(&mut AIStateMachine) -> R) -> Option<R> {
        self.ai
            .as_ref()
            .map(|ai| f(&mut ai.lock().unwrap_or_else(PoisonError::into_inner)))
    }

    /// Switch the AI to `state`; unknown states are ignored
    ///
    /// # Returns
    /// `false` only when the entity has no AI
    pub fn set_ai_state(&self, state: &str) -> bool {
        self.map_ai(|ai| ai.set_state(state)).is_some()
    }

    /// Name of the AI's current state
    pub fn current_ai_state(&self) -> Option<String> {
        self.map_ai(|ai| ai.current_state().to_string())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("rigidbody", &self.rigidbody)
            .field("collider", &self.collider)
            .field("ai", &self.current_ai_state())
            .finish()
    }
}
