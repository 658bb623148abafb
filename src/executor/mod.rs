//! Task execution infrastructure.
//!
//! This module provides the task envelope and result handle, the worker
//! loop, and the pool controller that ties them to the dual-lane queue.

pub mod pool;
pub mod task;
pub(crate) mod worker;

pub use pool::TaskPool;
pub use task::{TaskHandle, TaskId};

pub(crate) use task::Task;
