// worker thread internals
use crate::scheduler::DualQueue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "telemetry")]
use crate::telemetry::Metrics;

/// State shared between a registry record and its worker thread.
pub(crate) struct WorkerState {
    pub tasks_handled: AtomicU64,
    pub retiring: AtomicBool,
}

impl WorkerState {
    pub fn new() -> Self {
        Self {
            tasks_handled: AtomicU64::new(0),
            retiring: AtomicBool::new(false),
        }
    }
}

pub(crate) struct Worker {
    pub name: String,
    pub state: Arc<WorkerState>,
    #[cfg(feature = "telemetry")]
    pub metrics: Arc<Metrics>,
}

impl Worker {
    // main loop: block on the queue, run each envelope outside the lock,
    // exit once the queue says so (retired, or closed and drained)
    pub fn run(&self, queue: Arc<DualQueue>) {
        while let Some(task) = queue.pop(&self.state.retiring) {
            let id = task.id;
            let start = Instant::now();

            let outcome = task.execute();
            let _elapsed_ns = start.elapsed().as_nanos() as u64;

            self.state.tasks_handled.fetch_add(1, Ordering::Relaxed);

            match outcome {
                Ok(()) => {
                    #[cfg(feature = "telemetry")]
                    self.metrics.record_task_execution(_elapsed_ns);
                }
                Err(msg) => {
                    eprintln!("[{}] task {:?} panicked: {}", self.name, id, msg);
                    #[cfg(feature = "telemetry")]
                    self.metrics.record_task_panic();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Task;

    fn test_worker() -> Worker {
        Worker {
            name: "test_worker".to_string(),
            state: Arc::new(WorkerState::new()),
            #[cfg(feature = "telemetry")]
            metrics: Arc::new(Metrics::new()),
        }
    }

    #[test]
    fn test_drains_closed_queue_then_exits() {
        let queue = Arc::new(DualQueue::new());
        let (first, first_handle) = Task::new(|| 1);
        let (second, second_handle) = Task::new(|| 2);
        queue.push(first).unwrap();
        queue.push(second).unwrap();
        queue.close();

        let worker = test_worker();
        worker.run(queue);

        assert_eq!(worker.state.tasks_handled.load(Ordering::Relaxed), 2);
        assert_eq!(first_handle.try_join().unwrap().unwrap(), 1);
        assert_eq!(second_handle.try_join().unwrap().unwrap(), 2);
    }

    #[test]
    fn test_panicking_task_does_not_kill_the_loop() {
        let queue = Arc::new(DualQueue::new());
        let (bad, _bad_handle) = Task::new(|| -> () { panic!("task panic") });
        let (good, good_handle) = Task::new(|| 5);
        queue.push(bad).unwrap();
        queue.push(good).unwrap();
        queue.close();

        let worker = test_worker();
        worker.run(queue);

        assert_eq!(worker.state.tasks_handled.load(Ordering::Relaxed), 2);
        assert_eq!(good_handle.try_join().unwrap().unwrap(), 5);
    }

    #[test]
    fn test_retired_worker_leaves_queue_untouched() {
        let queue = Arc::new(DualQueue::new());
        queue.push(Task::new(|| ()).0).unwrap();

        let worker = test_worker();
        worker.state.retiring.store(true, Ordering::Release);
        worker.run(queue.clone());

        assert_eq!(worker.state.tasks_handled.load(Ordering::Relaxed), 0);
        assert_eq!(queue.len(), 1);
    }
}
