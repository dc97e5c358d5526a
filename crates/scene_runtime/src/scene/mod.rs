//! Scenes and their concurrent construction
//!
//! A [`Scene`] owns the entities, cameras and lights described by a scene
//! description. [`SceneBuilder`] turns such a description into a scene,
//! building entities on a worker pool.

mod aggregate;
mod builder;

pub use aggregate::{Collision, Scene};
pub use builder::{BuildStage, EntityBuildFailure, EntityRequest, SceneBuilder};

use crate::assets::DescriptionError;
use crate::foundation::{PoolError, QueueError};
use thiserror::Error;

/// Scene construction and lookup errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Invalid argument
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The scene description is malformed
    #[error("invalid scene description: {0}")]
    Format(#[from] DescriptionError),

    /// The entity construction queue rejected a request
    #[error("entity queue: {0}")]
    Queue(#[from] QueueError),

    /// The worker pool could not run
    #[error("worker pool: {0}")]
    Pool(#[from] PoolError),

    /// Some entities failed to build; the rest are in `scene`
    #[error("scene \"{}\" built with {} failed entities and {} panicked workers", .scene.name(), .failures.len(), .panicked_workers)]
    PartialBuild {
        /// Scene holding every entity that was built
        scene: Box<Scene>,
        /// One entry per entity that failed
        failures: Vec<EntityBuildFailure>,
        /// Workers that panicked mid-entity
        panicked_workers: usize,
    },

    /// No camera with this name
    #[error("camera \"{0}\" not found")]
    CameraNotFound(String),

    /// No entity with this name
    #[error("entity \"{0}\" not found")]
    EntityNotFound(String),
}
