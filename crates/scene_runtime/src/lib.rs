//! # Scene Runtime
//!
//! Runtime core of a scene/entity engine: builds scenes from declarative
//! descriptions on a pool of worker threads, shares AI templates through a
//! name-keyed cache, and dispatches per-frame work through a named-task
//! scheduler.
//!
//! ## Features
//!
//! - **Concurrent scene loading**: entity descriptions are drained from a
//!   work queue by a fixed-size worker pool
//! - **Object cache**: AI state machines are parsed once per name and cloned
//!   for every entity
//! - **Task scheduler**: frame phases bound by name and mapped onto threads
//! - **AI phases**: per-frame pre-update and update queues, one entity per call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_runtime::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     engine.register_task("Render", task(|engine: &Engine| {
//!         if let Some(scene) = engine.scene() {
//!             log::info!("{scene}");
//!         }
//!         Ok(())
//!     }));
//!     engine.load_task_graph("resources/scheduler.json")?;
//!     engine.load_scene_from_path("resources/scene.json")?;
//!     engine.run_frame()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod ai;
pub mod assets;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod scheduler;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        ai::{callback, AIStateMachine, AiCache, AiCallback, AiError},
        assets::{Description, DescriptionError, ObjectCache},
        config::{Config, ConfigError, EngineConfig},
        ecs::{Entity, EntityError},
        foundation::{
            logging,
            math::{Mat4, Quat, Vec3},
            BoxError, WorkQueue, WorkerPool,
        },
        render::{Camera, Light},
        scene::{Scene, SceneBuilder, SceneError},
        scheduler::{task, SchedulerError, TaskCallback, TaskGraph, TaskRegistry},
        Engine, EngineError,
    };
}

#[cfg(test)]
mod tests;
