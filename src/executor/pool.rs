use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::task::{Task, TaskHandle};
use crate::executor::worker::{Worker, WorkerState};
use crate::scheduler::DualQueue;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[cfg(feature = "telemetry")]
use crate::telemetry::Metrics;

struct WorkerHandle {
    state: Arc<WorkerState>,
    thread: Option<JoinHandle<()>>,
}

/// Fixed-size pool of named worker threads fed by a dual-lane queue.
///
/// The pool is the public surface of the crate: submit work, inspect queue
/// depth and per-worker counters, toggle priority routing, restart a worker
/// by name, and tear the whole thing down. All operations take an explicit
/// pool instance; there is no global.
pub struct TaskPool {
    queue: Arc<DualQueue>,
    workers: Mutex<HashMap<String, WorkerHandle>>,
    config: Config,
    #[cfg(feature = "telemetry")]
    metrics: Arc<Metrics>,
}

impl TaskPool {
    /// Spawn a pool of `worker_count` workers named `<prefix>_<index>`,
    /// 0-indexed, with the default configuration otherwise.
    pub fn new(worker_count: usize) -> Result<Self> {
        Self::with_config(Config::builder().num_threads(worker_count).build()?)
    }

    /// Spawn a pool from an explicit [`Config`].
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let pool = Self {
            queue: Arc::new(DualQueue::new()),
            workers: Mutex::new(HashMap::new()),
            config,
            #[cfg(feature = "telemetry")]
            metrics: Arc::new(Metrics::new()),
        };

        {
            let mut workers = pool.workers.lock();
            for index in 0..pool.config.worker_threads() {
                let name = pool.config.worker_name(index);
                let handle = pool.spawn_worker(name.clone())?;
                workers.insert(name, handle);
            }
        }

        Ok(pool)
    }

    fn spawn_worker(&self, name: String) -> Result<WorkerHandle> {
        let state = Arc::new(WorkerState::new());
        let worker = Worker {
            name: name.clone(),
            state: state.clone(),
            #[cfg(feature = "telemetry")]
            metrics: self.metrics.clone(),
        };
        let queue = self.queue.clone();

        let mut builder = thread::Builder::new().name(name);
        if let Some(stack_size) = self.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let thread = builder
            .spawn(move || worker.run(queue))
            .map_err(|e| Error::executor(format!("spawn failed: {}", e)))?;

        Ok(WorkerHandle {
            state,
            thread: Some(thread),
        })
    }

    /// Submit a computation, receiving its result handle immediately.
    ///
    /// The submitter never blocks; the handle resolves once a worker has
    /// executed the computation. Whether the envelope lands in the priority
    /// or the normal lane is decided by the routing flag's value at this
    /// call, not at dequeue time.
    ///
    /// Fails with [`Error::PoolStopped`] once shutdown has begun; nothing is
    /// enqueued on that path.
    pub fn submit<F, T>(&self, f: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = Task::new(f);
        self.queue.push(task)?;

        #[cfg(feature = "telemetry")]
        self.metrics.record_task_submitted();

        Ok(handle)
    }

    /// Snapshot sum of both lane depths.
    ///
    /// Immediately stale in the presence of concurrent submitters and
    /// workers; useful for tests and rough load inspection only.
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Route all future submissions to the priority lane.
    pub fn set_priority_routing(&self) {
        self.queue.set_routing(true);
    }

    /// Route all future submissions back to the normal lane.
    pub fn reset_priority_routing(&self) {
        self.queue.set_routing(false);
    }

    /// Retire the named worker at its next loop iteration, join it, and
    /// spawn a replacement under the same name.
    ///
    /// A task already in flight on that worker runs to completion first;
    /// restart never interrupts execution. The replacement starts with a
    /// fresh `tasks_handled` counter. Queued work is untouched — the rest of
    /// the pool keeps draining it while the swap happens.
    pub fn restart_worker(&self, name: &str) -> Result<()> {
        if self.queue.is_closed() {
            return Err(Error::PoolStopped);
        }

        let mut workers = self.workers.lock();
        let entry = workers
            .get_mut(name)
            .ok_or_else(|| Error::unknown_worker(name))?;

        entry.state.retiring.store(true, Ordering::Release);
        self.queue.interrupt();

        if let Some(thread) = entry.thread.take() {
            let _ = thread.join();
        }

        *entry = self.spawn_worker(name.to_string())?;
        Ok(())
    }

    /// Names of all registered workers, in no particular order.
    pub fn worker_names(&self) -> Vec<String> {
        self.workers.lock().keys().cloned().collect()
    }

    /// Number of tasks the named worker has executed since it was spawned.
    pub fn tasks_handled(&self, name: &str) -> Result<u64> {
        let workers = self.workers.lock();
        let entry = workers.get(name).ok_or_else(|| Error::unknown_worker(name))?;
        Ok(entry.state.tasks_handled.load(Ordering::Relaxed))
    }

    /// Number of worker threads in the pool.
    pub fn num_workers(&self) -> usize {
        self.workers.lock().len()
    }

    /// Point-in-time view of pool-wide counters and latency percentiles.
    #[cfg(feature = "telemetry")]
    pub fn metrics_snapshot(&self) -> crate::telemetry::MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stop accepting submissions, drain queued work, and join every worker.
    ///
    /// Blocks until each worker has finished its in-flight task and the
    /// queue is empty. Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        self.queue.close();

        let mut workers = self.workers.lock();
        for handle in workers.values_mut() {
            if let Some(thread) = handle.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
