//! Static task graph: named threads, each an ordered list of tasks
//!
//! ```json
//! {
//!     "name": "Scheduler",
//!     "thread count": 1,
//!     "blocks": [
//!         { "name": "Game loop", "description": "Single threaded", "tasks": ["Input", "Render"] }
//!     ]
//! }
//! ```
//!
//! Task names are resolved against a [`TaskRegistry`] when the graph is
//! built. Running a thread executes its tasks synchronously, in order, on
//! the calling thread; mapping named threads onto OS threads is up to the
//! caller.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::task::{TaskCallback, TaskRegistry};
use super::SchedulerError;
use crate::assets::description;

#[derive(Debug, Deserialize)]
struct SchedulerDescription {
    name: String,
    #[serde(default, rename = "thread count")]
    thread_count: Option<usize>,
    #[serde(default)]
    blocks: Vec<ThreadDescription>,
}

#[derive(Debug, Deserialize)]
struct ThreadDescription {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tasks: Vec<String>,
}

/// Named, ordered list of task names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    name: String,
    description: Option<String>,
    tasks: Vec<String>,
}

impl Thread {
    /// Thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description from the scheduler file
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Task names in execution order
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }
}

/// Tasks mapped onto named threads
pub struct TaskGraph<C> {
    name: String,
    thread_count: Option<usize>,
    tasks: TaskRegistry<C>,
    threads: HashMap<String, Thread>,
}

impl<C> TaskGraph<C> {
    /// Build a graph from a scheduler description, or a path to one
    ///
    /// The graph keeps its own copy of `registry`; see
    /// [`TaskGraph::register_task`] to rebind afterwards.
    ///
    /// # Errors
    /// Fails on a malformed description, a duplicate thread name, or a task
    /// name missing from `registry`.
    pub fn build_from_description(registry: &TaskRegistry<C>, value: &Value) -> Result<Self, SchedulerError> {
        let resolved = description::resolve(value, "scheduler")?;
        let scheduler: SchedulerDescription = description::decode(&resolved, "scheduler")?;

        let mut threads = HashMap::with_capacity(scheduler.blocks.len());
        for block in scheduler.blocks {
            if let Some(task) = block.tasks.iter().find(|task| !registry.contains(task)) {
                return Err(SchedulerError::UnknownTask {
                    thread: block.name,
                    task: task.clone(),
                });
            }
            if threads.contains_key(&block.name) {
                return Err(SchedulerError::DuplicateThread(block.name));
            }
            log::debug!("Scheduler \"{}\": thread \"{}\" runs {:?}", scheduler.name, block.name, block.tasks);
            threads.insert(
                block.name.clone(),
                Thread {
                    name: block.name,
                    description: block.description,
                    tasks: block.tasks,
                },
            );
        }

        log::info!("Loaded scheduler \"{}\" with {} thread(s)", scheduler.name, threads.len());
        Ok(Self {
            name: scheduler.name,
            thread_count: scheduler.thread_count,
            tasks: registry.clone(),
            threads,
        })
    }

    /// Scheduler name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS thread count requested by the description, if any
    pub fn thread_count_hint(&self) -> Option<usize> {
        self.thread_count
    }

    /// Thread names, sorted
    pub fn thread_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.threads.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a thread
    pub fn thread(&self, name: &str) -> Option<&Thread> {
        self.threads.get(name)
    }

    /// Rebind a task the graph already knows
    ///
    /// Names the graph was not built with are ignored since no thread can
    /// refer to them.
    ///
    /// # Returns
    /// `true` if the task exists in the graph
    pub fn register_task(&mut self, name: &str, callback: TaskCallback<C>) -> bool {
        if !self.tasks.contains(name) {
            return false;
        }
        self.tasks.register_task(name, callback);
        true
    }

    /// Run every bound task of `thread_name` in listed order
    ///
    /// Stops at the first failing task.
    ///
    /// # Returns
    /// Number of callbacks that ran
    pub fn run_thread(&self, thread_name: &str, context: &C) -> Result<usize, SchedulerError> {
        let thread = self
            .threads
            .get(thread_name)
            .ok_or_else(|| SchedulerError::UnknownThread(thread_name.to_string()))?;

        let mut executed = 0;
        for name in &thread.tasks {
            let task = self.tasks.get(name).ok_or_else(|| SchedulerError::UnknownTask {
                thread: thread.name.clone(),
                task: name.clone(),
            })?;
            let ran = task.run(context).map_err(|source| SchedulerError::TaskFailed {
                thread: thread.name.clone(),
                task: name.clone(),
                source,
            })?;
            if ran {
                executed += 1;
            }
        }
        log::trace!("Thread \"{}\" ran {} task(s)", thread.name, executed);
        Ok(executed)
    }
}

impl<C> fmt::Debug for TaskGraph<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraph")
            .field("name", &self.name)
            .field("thread_count", &self.thread_count)
            .field("tasks", &self.tasks)
            .field("threads", &self.threads)
            .finish()
    }
}
