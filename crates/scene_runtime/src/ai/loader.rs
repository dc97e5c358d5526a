//! Building AI state machines from descriptions through the template cache

use serde::Deserialize;
use serde_json::Value;

use super::{AIStateMachine, AiError};
use crate::assets::{description, ObjectCache};

/// Cache of canonical AI templates keyed by AI name
pub type AiCache = ObjectCache<AIStateMachine>;

/// AI block of an entity description
///
/// ```json
/// { "name": "Guard", "states": ["idle", "alert"], "initial state": "idle" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AiDescription {
    /// Logical name, used as the cache key
    pub name: String,
    /// State names
    pub states: Vec<String>,
    /// State the instance starts in; must be one of `states`
    #[serde(rename = "initial state")]
    pub initial_state: String,
}

impl AiDescription {
    /// Decode an AI block, loading it from disk if it is given as a path
    pub fn from_value(value: &Value) -> Result<Self, AiError> {
        let resolved = description::resolve(value, "ai")?;
        Ok(description::decode(&resolved, "ai")?)
    }

    /// Construct a fresh canonical template from this description
    pub fn build_template(&self) -> Result<AIStateMachine, AiError> {
        AIStateMachine::new(&self.name, self.states.iter().cloned(), &self.initial_state)
    }
}

/// Produce an entity-owned AI instance for `description`
///
/// The first description seen for a name is parsed into the canonical
/// template; every caller, including that first one, receives a private
/// clone set to its own `initial state`. Later descriptions sharing the
/// name reuse the template's states.
///
/// # Returns
/// The private instance and whether the template came from the cache
pub fn instantiate(cache: &AiCache, description: &AiDescription) -> Result<(AIStateMachine, bool), AiError> {
    let (mut ai, was_cached) = cache.instantiate(&description.name, || description.build_template())?;

    if was_cached && !ai.has_state(&description.initial_state) {
        return Err(AiError::UnknownInitialState {
            ai: description.name.clone(),
            state: description.initial_state.clone(),
        });
    }
    ai.set_state(&description.initial_state);

    Ok((ai, was_cached))
}
