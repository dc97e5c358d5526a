//! Named frame tasks and the registry they are resolved against

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::foundation::BoxError;

/// Frame phases every engine registers at start-up
///
/// "AI" and "Pre AI" are bound by the engine itself; the rest stay
/// reserved (no-op) until a collaborator binds them.
pub const BUILTIN_TASKS: [&str; 9] = [
    "Input",
    "UI",
    "AI",
    "Pre AI",
    "Resolve Collisions",
    "Update Forces",
    "Move Objects",
    "Animation",
    "Render",
];

/// Callable bound to a task; `C` is the context handed to every task
pub type TaskCallback<C> = Arc<dyn Fn(&C) -> Result<(), BoxError> + Send + Sync>;

/// Wrap a closure as a [`TaskCallback`]
pub fn task<C, F>(f: F) -> TaskCallback<C>
where
    F: Fn(&C) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A named phase, optionally bound to a callback
pub struct Task<C> {
    name: String,
    callback: Option<TaskCallback<C>>,
}

impl<C> Task<C> {
    /// Task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Does the task have a callback?
    pub fn is_bound(&self) -> bool {
        self.callback.is_some()
    }

    /// Run the callback, if any
    ///
    /// # Returns
    /// `true` if a callback ran
    pub fn run(&self, context: &C) -> Result<bool, BoxError> {
        match &self.callback {
            Some(callback) => callback(context).map(|()| true),
            None => Ok(false),
        }
    }
}

impl<C> Clone for Task<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<C> fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Tasks known to a scheduler, keyed by name
pub struct TaskRegistry<C> {
    tasks: HashMap<String, Task<C>>,
}

impl<C> TaskRegistry<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tasks: HashMap::new() }
    }

    /// Create a registry holding every [`BUILTIN_TASKS`] name, unbound
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_TASKS {
            registry.reserve_task(name);
        }
        registry
    }

    /// Bind `callback` to `name`, adding the task if needed
    ///
    /// # Returns
    /// `true` if a previous callback was replaced
    pub fn register_task(&mut self, name: impl Into<String>, callback: TaskCallback<C>) -> bool {
        let name = name.into();
        log::debug!("Registering task \"{}\"", name);
        let task = self.tasks.entry(name.clone()).or_insert_with(|| Task { name, callback: None });
        task.callback.replace(callback).is_some()
    }

    /// Make `name` resolvable without binding a callback
    pub fn reserve_task(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.tasks
            .entry(name.clone())
            .or_insert_with(|| Task { name, callback: None });
    }

    /// Look up a task
    pub fn get(&self, name: &str) -> Option<&Task<C>> {
        self.tasks.get(name)
    }

    /// Is `name` registered?
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no task is registered
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C> Default for TaskRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for TaskRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
        }
    }
}

impl<C> fmt::Debug for TaskRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry").field("tasks", &self.names()).finish()
    }
}
