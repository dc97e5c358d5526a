//! Named-task scheduler
//!
//! Frame phases are registered as tasks by name. A scheduler description
//! maps them onto named threads, and [`TaskGraph::run_thread`] runs one
//! thread's tasks in order.

mod graph;
mod task;

pub use graph::{TaskGraph, Thread};
pub use task::{task, Task, TaskCallback, TaskRegistry, BUILTIN_TASKS};

use crate::assets::DescriptionError;
use crate::foundation::BoxError;
use thiserror::Error;

/// Scheduler loading and dispatch errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The scheduler description is malformed
    #[error("invalid scheduler description: {0}")]
    Format(#[from] DescriptionError),

    /// A thread lists a task that is not registered
    #[error("thread \"{thread}\" refers to unknown task \"{task}\"")]
    UnknownTask {
        /// Thread listing the task
        thread: String,
        /// Unresolved task name
        task: String,
    },

    /// Two threads share a name
    #[error("thread \"{0}\" is declared twice")]
    DuplicateThread(String),

    /// No thread with this name
    #[error("unknown thread \"{0}\"")]
    UnknownThread(String),

    /// A task callback failed
    #[error("task \"{task}\" failed on thread \"{thread}\": {source}")]
    TaskFailed {
        /// Thread being run
        thread: String,
        /// Failing task
        task: String,
        /// Error returned by the callback
        #[source]
        source: BoxError,
    },
}
