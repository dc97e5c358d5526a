//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Thread-safe work queues and the worker pool that drains them
//! - Logging utilities

pub mod math;
pub mod logging;
pub mod work_queue;
pub mod worker_pool;

pub use work_queue::{QueueError, WorkQueue};
pub use worker_pool::{PoolError, PoolReport, WorkerPool};

/// Error type returned by user supplied callbacks (AI states, scheduler tasks)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
