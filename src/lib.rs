//! KARYA - priority-aware task execution pool.
//!
//! A bounded set of named worker threads executes client-submitted
//! computations and hands back an asynchronous result handle for each.
//! Newly submitted work can be routed ahead of already-queued work with a
//! runtime toggle, individual workers can be restarted by name without
//! disturbing the rest of the pool, and shutdown drains everything that was
//! accepted before the workers exit.
//!
//! # Quick Start
//!
//! ```
//! use karya_rs::TaskPool;
//!
//! let mut pool = TaskPool::new(2).unwrap();
//!
//! let handle = pool.submit(|| 21 * 2).unwrap();
//! assert_eq!(handle.join().unwrap(), 42);
//!
//! pool.shutdown();
//! ```
//!
//! # Features
//!
//! - **Dual-lane queue**: a priority lane that always wins over the normal
//!   lane, selected per submission by a pool-wide routing flag
//! - **Result handles**: blocking, polling, and timeout-bounded joins; a
//!   panicking computation surfaces on its own handle, never in the pool
//! - **Named workers**: per-worker task counters and restart by name
//! - **Draining shutdown**: work accepted before teardown always runs
//! - **Telemetry**: task counters and latency percentiles (optional)

// Lint configuration
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod scheduler;
pub mod telemetry;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::{TaskHandle, TaskId, TaskPool};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_and_join() {
        let pool = TaskPool::new(2).unwrap();

        let handle = pool.submit(|| 40 + 2).unwrap();
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn test_workers_follow_naming_convention() {
        let pool = TaskPool::new(3).unwrap();

        let mut names = pool.worker_names();
        names.sort();
        assert_eq!(
            names,
            vec![
                "Task_Pool_thread_0",
                "Task_Pool_thread_1",
                "Task_Pool_thread_2",
            ]
        );
    }

    #[test]
    fn test_custom_config() {
        let config = Config::builder()
            .num_threads(1)
            .thread_name_prefix("karya")
            .build()
            .unwrap();

        let pool = TaskPool::with_config(config).unwrap();
        assert_eq!(pool.num_workers(), 1);
        assert_eq!(pool.worker_names(), vec!["karya_0"]);
    }
}
