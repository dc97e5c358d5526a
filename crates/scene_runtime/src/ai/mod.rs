//! AI state machines and the per-frame AI phases
//!
//! Entities with an `ai` block carry an [`AIStateMachine`]. Templates are
//! deduplicated by name through an [`AiCache`]; every entity owns a private
//! clone. Each frame the engine feeds AI-bearing entities through
//! [`AiQueues`], whose phases run one entity per call.

mod loader;
mod phases;
mod state_machine;

pub use loader::{instantiate, AiCache, AiDescription};
pub use phases::AiQueues;
pub use state_machine::{callback, AIStateMachine, AiCallback};

use crate::assets::DescriptionError;
use crate::foundation::BoxError;
use thiserror::Error;

/// AI construction and dispatch errors
#[derive(Error, Debug)]
pub enum AiError {
    /// The AI block is malformed
    #[error(transparent)]
    Description(#[from] DescriptionError),

    /// The AI has an empty name
    #[error("AI name must not be empty")]
    EmptyName,

    /// The AI declares no states
    #[error("AI \"{ai}\" declares no states")]
    NoStates {
        /// AI name
        ai: String,
    },

    /// The initial state is not one of the AI's states
    #[error("AI \"{ai}\" has no state \"{state}\" to start in")]
    UnknownInitialState {
        /// AI name
        ai: String,
        /// Requested initial state
        state: String,
    },

    /// A state or pre-update callback failed
    #[error("AI {phase} callback failed for entity \"{entity}\": {source}")]
    Callback {
        /// Entity whose callback failed
        entity: String,
        /// "update" or "pre-update"
        phase: &'static str,
        /// Error returned by the callback
        #[source]
        source: BoxError,
    },
}
