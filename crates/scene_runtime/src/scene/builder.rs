//! Concurrent scene construction
//!
//! [`SceneBuilder::build`] walks a scene description through a fixed
//! sequence of stages:
//!
//! ```text
//! Empty -> NameParsed -> EntitiesQueued -> EntitiesBuilt -> CamerasBuilt -> LightsBuilt -> Finalized
//! ```
//!
//! Entities are built in parallel: every entity description is pushed onto
//! a [`WorkQueue`] and a [`WorkerPool`] drains it, folding finished entities
//! into the scene under the scene's lock. Cameras and lights are cheap and
//! are built on the calling thread afterwards.

use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use super::{Scene, SceneError};
use crate::ai::AiCache;
use crate::assets::description::{self, OneOrMany};
use crate::ecs::{Entity, EntityError};
use crate::foundation::{WorkQueue, WorkerPool};
use crate::render::{Camera, CameraDescription, Light, LightDescription};

/// Progress of a scene build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStage {
    /// Nothing parsed yet
    Empty,
    /// The scene name was read and the aggregate created
    NameParsed,
    /// Every entity description sits in the construction queue
    EntitiesQueued,
    /// The worker pool has been joined
    EntitiesBuilt,
    /// Cameras were added
    CamerasBuilt,
    /// Lights and light probes were processed
    LightsBuilt,
    /// The build is over
    Finalized,
}

/// One entity description waiting in the construction queue
#[derive(Debug, Clone)]
pub struct EntityRequest {
    /// Position in the description's `entities` array
    pub index: usize,
    /// The entity description (or a path to it)
    pub description: Value,
}

/// An entity that could not be built
#[derive(Debug)]
pub struct EntityBuildFailure {
    /// Position in the description's `entities` array
    pub index: usize,
    /// Entity name, if the description got far enough to have one
    pub name: Option<String>,
    /// What went wrong
    pub error: EntityError,
}

/// Builds [`Scene`]s from descriptions with a pool of worker threads
#[derive(Debug)]
pub struct SceneBuilder<'a> {
    ai_cache: &'a AiCache,
    pool: WorkerPool,
    queue_capacity: Option<usize>,
    stage: BuildStage,
}

impl<'a> SceneBuilder<'a> {
    /// Create a builder sharing `ai_cache` for AI templates
    pub fn new(ai_cache: &'a AiCache, pool: WorkerPool) -> Self {
        Self {
            ai_cache,
            pool,
            queue_capacity: None,
            stage: BuildStage::Empty,
        }
    }

    /// Bound the entity construction queue
    ///
    /// A scene with more entities than `capacity` fails to queue them.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Stage reached by the last (or current) build
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Build a scene from its description, or a path to one
    ///
    /// Structural problems (missing name, wrongly typed sections, a bad
    /// camera or light) abort the build. Entity failures do not: siblings
    /// keep building and the result is [`SceneError::PartialBuild`] carrying
    /// the scene assembled from the entities that succeeded.
    pub fn build(&mut self, scene_description: &Value) -> Result<Scene, SceneError> {
        self.stage = BuildStage::Empty;

        let resolved = description::resolve(scene_description, "scene")?;
        let object = description::as_object(&resolved, "scene")?;
        let mut scene = Scene::new(description::required_str(object, "name")?)?;
        self.advance(BuildStage::NameParsed);

        let entity_descriptions = description::optional_array(object, "entities")?;
        let requests = entity_descriptions.map_or(0, Vec::len);
        let queue = WorkQueue::bounded(self.queue_capacity.unwrap_or(requests));
        for (index, entity) in entity_descriptions.into_iter().flatten().enumerate() {
            queue.push(EntityRequest {
                index,
                description: entity.clone(),
            })?;
        }
        self.advance(BuildStage::EntitiesQueued);

        let (failures, panicked_workers) = if queue.is_empty() {
            (Vec::new(), 0)
        } else {
            self.build_entities(&queue, &mut scene)?
        };
        self.advance(BuildStage::EntitiesBuilt);

        if let Some(cameras) = object.get("cameras") {
            let cameras: OneOrMany<CameraDescription> = description::decode(cameras, "cameras")?;
            for camera in cameras.into_vec() {
                scene.append_camera(Camera::try_from(camera)?);
            }
        }
        self.advance(BuildStage::CamerasBuilt);

        for light in description::optional_array(object, "lights")?.into_iter().flatten() {
            let light: LightDescription = description::decode(light, "light")?;
            scene.append_light(Light::try_from(light)?);
        }
        if let Some(probes) = description::optional_array(object, "light probes")? {
            scene.set_light_probe_count(probes.len());
        }
        self.advance(BuildStage::LightsBuilt);

        self.advance(BuildStage::Finalized);
        log::info!(
            "Built scene \"{}\": {} entities ({} actors, {} with AI), {} cameras, {} lights, {} failed",
            scene.name(),
            scene.entity_count(),
            scene.actor_count(),
            scene.ai_count(),
            scene.camera_count(),
            scene.light_count(),
            failures.len()
        );

        if failures.is_empty() && panicked_workers == 0 {
            Ok(scene)
        } else {
            Err(SceneError::PartialBuild {
                scene: Box::new(scene),
                failures,
                panicked_workers,
            })
        }
    }

    fn build_entities(
        &self,
        queue: &WorkQueue<EntityRequest>,
        scene: &mut Scene,
    ) -> Result<(Vec<EntityBuildFailure>, usize), SceneError> {
        let shared = Mutex::new(std::mem::take(scene));
        let ai_cache = self.ai_cache;

        let drained = self.pool.drain(queue, |request: EntityRequest| -> Result<(), EntityBuildFailure> {
            // Parse outside the scene lock; only the insert is serialized
            let entity = Entity::from_description(&request.description, ai_cache).map_err(|error| {
                let name = request
                    .description
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                log::warn!(
                    "Failed to build entity #{} ({}): {}",
                    request.index,
                    name.as_deref().unwrap_or("unnamed"),
                    error
                );
                EntityBuildFailure {
                    index: request.index,
                    name,
                    error,
                }
            })?;
            shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .append_entity(entity);
            Ok(())
        });

        *scene = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        let report = drained?;
        log::debug!(
            "Entity construction finished: {} processed on {} worker(s)",
            report.processed,
            self.pool.thread_count()
        );
        Ok((report.failures, report.panicked_workers))
    }

    fn advance(&mut self, next: BuildStage) {
        debug_assert!(next > self.stage, "scene build stages only move forward");
        log::trace!("Scene build: {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }
}
