//! Per-entity AI state machine

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::AiError;
use crate::ecs::Entity;
use crate::foundation::BoxError;

/// Callable bound to an AI state or to the pre-update phase
///
/// Receives the entity that owns the state machine. The entity's AI lock is
/// not held during the call, so the callback may switch states through
/// [`Entity::set_ai_state`].
pub type AiCallback = Arc<dyn Fn(&Entity) -> Result<(), BoxError> + Send + Sync>;

/// Wrap a closure as an [`AiCallback`]
pub fn callback<F>(f: F) -> AiCallback
where
    F: Fn(&Entity) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Named set of states, each optionally bound to a callback
///
/// `current_state` is always one of the keys of `states`. Cloning yields a
/// fully independent machine: a fresh state map and name; only the
/// immutable callback closures are shared.
#[derive(Clone)]
pub struct AIStateMachine {
    name: String,
    states: HashMap<String, Option<AiCallback>>,
    current_state: String,
    pre_update: Option<AiCallback>,
}

impl AIStateMachine {
    /// Create a state machine with unbound states
    ///
    /// # Errors
    /// Fails if `name` is empty, `states` is empty, or `initial_state` is
    /// not one of `states`.
    pub fn new<I, S>(name: impl Into<String>, states: I, initial_state: &str) -> Result<Self, AiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(AiError::EmptyName);
        }

        let states: HashMap<String, Option<AiCallback>> =
            states.into_iter().map(|state| (state.into(), None)).collect();
        if states.is_empty() {
            return Err(AiError::NoStates { ai: name });
        }
        if !states.contains_key(initial_state) {
            return Err(AiError::UnknownInitialState {
                ai: name,
                state: initial_state.to_string(),
            });
        }

        Ok(Self {
            name,
            states,
            current_state: initial_state.to_string(),
            pre_update: None,
        })
    }

    /// Logical name (the cache key)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the active state
    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    /// All state names, sorted
    pub fn states(&self) -> Vec<&str> {
        let mut states: Vec<&str> = self.states.keys().map(String::as_str).collect();
        states.sort_unstable();
        states
    }

    /// Check whether `state` is one of this machine's states
    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains_key(state)
    }

    /// Switch to `state`
    ///
    /// Always succeeds. Requesting a state the machine does not have keeps
    /// the current state; use [`AIStateMachine::has_state`] to tell the
    /// cases apart.
    pub fn set_state(&mut self, state: &str) {
        if !self.states.contains_key(state) {
            log::trace!("AI \"{}\": ignoring unknown state \"{}\"", self.name, state);
            return;
        }
        if self.current_state != state {
            log::trace!("AI \"{}\": {} -> {}", self.name, self.current_state, state);
            self.current_state = state.to_string();
        }
    }

    /// Bind `callback` to `state`, adding the state if it does not exist
    pub fn add_state_callback(&mut self, state: impl Into<String>, callback: AiCallback) {
        self.states.insert(state.into(), Some(callback));
    }

    /// Bind the callback run by the pre-update phase
    pub fn set_pre_update_callback(&mut self, callback: AiCallback) {
        self.pre_update = Some(callback);
    }

    /// Callback bound to the active state, if any
    pub fn current_callback(&self) -> Option<AiCallback> {
        self.states.get(&self.current_state).cloned().flatten()
    }

    /// Callback bound to the pre-update phase, if any
    pub fn pre_update_callback(&self) -> Option<AiCallback> {
        self.pre_update.clone()
    }
}

impl fmt::Debug for AIStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound: Vec<&str> = self
            .states()
            .into_iter()
            .filter(|state| matches!(self.states.get(*state), Some(Some(_))))
            .collect();
        f.debug_struct("AIStateMachine")
            .field("name", &self.name)
            .field("current_state", &self.current_state)
            .field("states", &self.states())
            .field("bound_states", &bound)
            .field("has_pre_update", &self.pre_update.is_some())
            .finish()
    }
}

impl fmt::Display for AIStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " - AI info - ")?;
        writeln!(f, "name        : \"{}\"", self.name)?;
        writeln!(f, "active state: \"{}\"", self.current_state)?;
        writeln!(f, "states      : ")?;
        for (i, state) in self.states().iter().enumerate() {
            writeln!(f, "\t[{i}] \"{state}\"")?;
        }
        Ok(())
    }
}
