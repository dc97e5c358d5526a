//! Core engine implementation
//!
//! The [`Engine`] owns everything that outlives a single frame: settings,
//! the AI template cache, the AI request queues, the task registry and
//! graph, and the active scene. Scheduler tasks receive `&Engine`.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::ai::{AiCache, AiError, AiQueues};
use crate::assets::{description, DescriptionError};
use crate::config::{ConfigError, EngineConfig};
use crate::foundation::{QueueError, WorkerPool};
use crate::scene::{Scene, SceneBuilder, SceneError};
use crate::scheduler::{task, SchedulerError, TaskCallback, TaskGraph, TaskRegistry};

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad settings
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A description file could not be loaded
    #[error("Description error: {0}")]
    Description(#[from] DescriptionError),

    /// Scene construction or lookup failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Scheduler loading or dispatch failed
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// An AI phase failed
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// An AI queue rejected a request
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// No scheduler description has been loaded
    #[error("No task graph loaded")]
    NoTaskGraph,

    /// No scene has been loaded
    #[error("No scene loaded")]
    NoScene,
}

/// Main engine struct
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    ai_cache: AiCache,
    ai_queues: AiQueues,
    tasks: TaskRegistry<Engine>,
    task_graph: Option<TaskGraph<Engine>>,
    scene: Option<Scene>,
}

impl Engine {
    /// Create an engine with every built-in task registered
    ///
    /// "AI" and "Pre AI" are bound to [`Engine::update_phase`] and
    /// [`Engine::pre_update_phase`]; the other built-ins are reserved.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine ({} loading thread(s))",
            config.loading_thread_count
        );

        let mut tasks = TaskRegistry::with_builtins();
        tasks.register_task(
            "AI",
            task(|engine: &Self| engine.update_phase().map(drop).map_err(Into::into)),
        );
        tasks.register_task(
            "Pre AI",
            task(|engine: &Self| engine.pre_update_phase().map(drop).map_err(Into::into)),
        );

        Ok(Self {
            config,
            ai_cache: AiCache::with_label("AI"),
            ai_queues: AiQueues::new(),
            tasks,
            task_graph: None,
            scene: None,
        })
    }

    /// Engine settings
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bind `callback` to the task `name`
    ///
    /// Rebinding also reaches an already built task graph.
    pub fn register_task(&mut self, name: &str, callback: TaskCallback<Self>) {
        if let Some(graph) = &mut self.task_graph {
            graph.register_task(name, callback.clone());
        }
        self.tasks.register_task(name, callback);
    }

    /// Registered tasks
    pub fn tasks(&self) -> &TaskRegistry<Self> {
        &self.tasks
    }

    /// Build the task graph from a scheduler description, or a path to one
    pub fn build_task_graph(&mut self, scheduler: &Value) -> Result<&TaskGraph<Self>, EngineError> {
        let graph = TaskGraph::build_from_description(&self.tasks, scheduler)?;
        Ok(self.task_graph.insert(graph))
    }

    /// Load a scheduler description file and build the task graph from it
    pub fn load_task_graph(&mut self, path: impl AsRef<Path>) -> Result<&TaskGraph<Self>, EngineError> {
        let scheduler = description::load(path)?;
        self.build_task_graph(&scheduler)
    }

    /// The current task graph
    pub fn task_graph(&self) -> Option<&TaskGraph<Self>> {
        self.task_graph.as_ref()
    }

    /// Run one named thread of the task graph on the calling thread
    ///
    /// # Returns
    /// Number of task callbacks that ran
    pub fn run_thread(&self, thread_name: &str) -> Result<usize, EngineError> {
        let graph = self.task_graph.as_ref().ok_or(EngineError::NoTaskGraph)?;
        Ok(graph.run_thread(thread_name, self)?)
    }

    /// Run every thread of the task graph once
    ///
    /// Threads run one after another in name order. Each AI queue that has
    /// run dry is first refilled on its own, so every AI-bearing entity gets
    /// a turn in each phase before that phase revisits any of them.
    ///
    /// # Returns
    /// Number of task callbacks that ran
    pub fn run_frame(&self) -> Result<usize, EngineError> {
        let graph = self.task_graph.as_ref().ok_or(EngineError::NoTaskGraph)?;
        self.refill_dry_ai_queues()?;

        let mut executed = 0;
        for thread in graph.thread_names() {
            executed += graph.run_thread(thread, self)?;
        }
        Ok(executed)
    }

    /// Build a scene without making it active
    ///
    /// Entities are built on `loading_thread_count` worker threads, sharing
    /// this engine's AI template cache.
    pub fn build_scene(&self, scene: &Value) -> Result<Scene, SceneError> {
        let pool = WorkerPool::new(self.config.loading_thread_count)?.with_name("scene-loader");
        let mut builder = SceneBuilder::new(&self.ai_cache, pool);
        if let Some(capacity) = self.config.entity_queue_capacity {
            builder = builder.with_queue_capacity(capacity);
        }
        builder.build(scene)
    }

    /// Build a scene and make it active
    ///
    /// The active scene is replaced only if every part of the new one was
    /// built. Pending AI requests for the old scene are dropped.
    pub fn load_scene(&mut self, scene: &Value) -> Result<&Scene, EngineError> {
        let scene = self.build_scene(scene)?;
        self.ai_queues.clear();
        log::info!("Scene \"{}\" is now active", scene.name());
        Ok(self.scene.insert(scene))
    }

    /// Load a scene description file and make it active
    pub fn load_scene_from_path(&mut self, path: impl AsRef<Path>) -> Result<&Scene, EngineError> {
        let scene = description::load(path)?;
        self.load_scene(&scene)
    }

    /// The active scene
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// The active scene, mutably
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Select the active scene's camera
    pub fn set_active_camera(&mut self, name: &str) -> Result<(), EngineError> {
        let scene = self.scene.as_mut().ok_or(EngineError::NoScene)?;
        Ok(scene.set_active_camera(name)?)
    }

    /// AI templates shared by every scene this engine builds
    pub fn ai_cache(&self) -> &AiCache {
        &self.ai_cache
    }

    /// AI request queues
    pub fn ai_queues(&self) -> &AiQueues {
        &self.ai_queues
    }

    /// Refill both AI queues with the active scene's AI-bearing entities
    ///
    /// Requests left over from the previous frame are dropped.
    ///
    /// # Returns
    /// Number of entities queued
    pub fn queue_ai_updates(&self) -> Result<usize, EngineError> {
        match &self.scene {
            Some(scene) => Ok(self.ai_queues.submit(scene.ais())?),
            None => {
                self.ai_queues.clear();
                Ok(0)
            }
        }
    }

    fn refill_dry_ai_queues(&self) -> Result<(), EngineError> {
        let Some(scene) = &self.scene else {
            return Ok(());
        };
        let (pre_update, update) = self.ai_queues.pending();
        if pre_update == 0 {
            self.ai_queues.submit_pre_update(scene.ais())?;
        }
        if update == 0 {
            self.ai_queues.submit_update(scene.ais())?;
        }
        Ok(())
    }

    /// Run the pre-update callback of at most one queued entity
    pub fn pre_update_phase(&self) -> Result<bool, AiError> {
        self.ai_queues.pre_update_phase()
    }

    /// Run the current state callback of at most one queued entity
    pub fn update_phase(&self) -> Result<bool, AiError> {
        self.ai_queues.update_phase()
    }
}
