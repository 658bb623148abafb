//! Task envelope and result handle.

use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a submitted task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Internal unit of work: the bound computation plus the write side of the
/// caller's completion slot.
pub(crate) struct Task {
    pub(crate) id: TaskId,
    payload: Box<dyn FnOnce() -> std::result::Result<(), String> + Send + 'static>,
}

impl Task {
    /// Bind a computation into an envelope and hand back the read side of
    /// its completion slot.
    ///
    /// The payload resolves the slot exactly once, with the computation's
    /// value or with a captured panic, and reports the panic message back so
    /// the executing worker can account for it. Each envelope is dequeued by
    /// exactly one worker, so the slot is never resolved twice.
    pub fn new<F, T>(f: F) -> (Self, TaskHandle<T>)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let id = TaskId::next();
        let (tx, rx) = bounded(1);

        let payload = Box::new(move || match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => {
                let _ = tx.send(Ok(value));
                Ok(())
            }
            Err(panic) => {
                let msg = panic_message(panic);
                let _ = tx.send(Err(Error::task_failed(msg.clone())));
                Err(msg)
            }
        });

        (Task { id, payload }, TaskHandle { id, receiver: rx })
    }

    /// Run the payload, resolving the completion slot. Returns the panic
    /// message if the computation panicked.
    pub fn execute(self) -> std::result::Result<(), String> {
        (self.payload)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Caller-held handle that resolves to a task's outcome.
///
/// Returned by [`TaskPool::submit`](crate::TaskPool::submit) immediately; the
/// outcome becomes available once a worker has executed the task.
pub struct TaskHandle<T> {
    id: TaskId,
    receiver: Receiver<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// The identifier assigned to this task at submission.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Block until the task has run, yielding its value or captured failure.
    pub fn join(self) -> Result<T> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(Error::executor("task dropped without resolving its handle")),
        }
    }

    /// Poll for the outcome without blocking.
    pub fn try_join(&self) -> Option<Result<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::executor(
                "task dropped without resolving its handle",
            ))),
        }
    }

    /// Wait up to `timeout` for the outcome.
    ///
    /// The timeout bounds only this call; it has no effect on the task's
    /// execution in the pool.
    pub fn join_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(Error::executor(
                "task dropped without resolving its handle",
            ))),
        }
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle").field("id", &self.id).finish()
    }
}
