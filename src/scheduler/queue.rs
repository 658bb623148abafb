use crate::error::{Error, Result};
use crate::executor::Task;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Lanes {
    normal: VecDeque<Task>,
    priority: VecDeque<Task>,
    route_to_priority: bool,
    stopping: bool,
}

/// Two FIFO lanes behind one lock and one condition.
///
/// Submitters append under the lock and wake exactly one parked worker;
/// broadcast is reserved for [`close`](DualQueue::close) and
/// [`interrupt`](DualQueue::interrupt). Workers pop the priority lane first
/// and execute outside the lock.
pub(crate) struct DualQueue {
    lanes: Mutex<Lanes>,
    available: Condvar,
}

impl DualQueue {
    pub fn new() -> Self {
        Self {
            lanes: Mutex::new(Lanes::default()),
            available: Condvar::new(),
        }
    }

    /// Append to the lane selected by the routing flag at this moment.
    ///
    /// Fails without side effects once the queue is closed.
    pub fn push(&self, task: Task) -> Result<()> {
        {
            let mut lanes = self.lanes.lock();
            if lanes.stopping {
                return Err(Error::PoolStopped);
            }
            if lanes.route_to_priority {
                lanes.priority.push_back(task);
            } else {
                lanes.normal.push_back(task);
            }
        }
        self.available.notify_one();
        Ok(())
    }

    /// Blocking dequeue for a worker loop.
    ///
    /// Returns `None` when the worker should exit: its retire flag is set,
    /// or the queue is closed and both lanes have drained. The priority lane
    /// always wins when both are non-empty, so sustained priority traffic
    /// starves the normal lane.
    pub fn pop(&self, retiring: &AtomicBool) -> Option<Task> {
        let mut lanes = self.lanes.lock();
        loop {
            if retiring.load(Ordering::Acquire) {
                return None;
            }
            if let Some(task) = lanes.priority.pop_front() {
                return Some(task);
            }
            if let Some(task) = lanes.normal.pop_front() {
                return Some(task);
            }
            if lanes.stopping {
                return None;
            }
            self.available.wait(&mut lanes);
        }
    }

    /// Route future submissions to the priority lane, or back to normal.
    /// Envelopes already queued never move between lanes.
    pub fn set_routing(&self, to_priority: bool) {
        self.lanes.lock().route_to_priority = to_priority;
    }

    /// Snapshot sum of both lane depths. Stale as soon as the lock drops.
    pub fn len(&self) -> usize {
        let lanes = self.lanes.lock();
        lanes.normal.len() + lanes.priority.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lanes.lock().stopping
    }

    /// Stop accepting work and wake every worker so queued envelopes drain.
    pub fn close(&self) {
        self.lanes.lock().stopping = true;
        self.available.notify_all();
    }

    /// Wake every parked worker without changing queue state.
    ///
    /// Used after a worker's retire flag flips; taking the lock first closes
    /// the window where that worker has checked its flag but not yet parked.
    pub fn interrupt(&self) {
        let _lanes = self.lanes.lock();
        self.available.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::task::TaskHandle;

    fn tagged(tag: i32) -> (Task, TaskHandle<i32>) {
        Task::new(move || tag)
    }

    fn live() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn test_fifo_within_a_lane() {
        let queue = DualQueue::new();
        let retiring = live();

        let mut handles = Vec::new();
        for tag in 0..3 {
            let (task, handle) = tagged(tag);
            queue.push(task).unwrap();
            handles.push(handle);
        }

        for (i, handle) in handles.iter().enumerate() {
            assert!(handle.try_join().is_none());
            queue.pop(&retiring).unwrap().execute().unwrap();
            assert_eq!(handle.try_join().unwrap().unwrap(), i as i32);
        }
    }

    #[test]
    fn test_priority_lane_wins_over_earlier_normal() {
        let queue = DualQueue::new();
        let retiring = live();

        let (normal, normal_handle) = tagged(1);
        queue.push(normal).unwrap();

        queue.set_routing(true);
        let (urgent, urgent_handle) = tagged(99);
        queue.push(urgent).unwrap();

        queue.pop(&retiring).unwrap().execute().unwrap();
        assert_eq!(urgent_handle.try_join().unwrap().unwrap(), 99);
        assert!(normal_handle.try_join().is_none());
    }

    #[test]
    fn test_routing_flag_affects_only_future_pushes() {
        let queue = DualQueue::new();
        let retiring = live();

        let (early, early_handle) = tagged(1);
        queue.push(early).unwrap();

        // flipping the flag must not promote the queued envelope
        queue.set_routing(true);
        queue.set_routing(false);

        queue.pop(&retiring).unwrap().execute().unwrap();
        assert_eq!(early_handle.try_join().unwrap().unwrap(), 1);
    }

    #[test]
    fn test_len_sums_both_lanes() {
        let queue = DualQueue::new();

        queue.push(tagged(1).0).unwrap();
        queue.set_routing(true);
        queue.push(tagged(2).0).unwrap();
        queue.push(tagged(3).0).unwrap();

        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_push_after_close_fails_without_side_effects() {
        let queue = DualQueue::new();
        queue.close();

        let result = queue.push(tagged(1).0);
        assert!(matches!(result, Err(Error::PoolStopped)));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_close_drains_before_terminal_none() {
        let queue = DualQueue::new();
        let retiring = live();

        queue.push(tagged(1).0).unwrap();
        queue.push(tagged(2).0).unwrap();
        queue.close();

        assert!(queue.pop(&retiring).is_some());
        assert!(queue.pop(&retiring).is_some());
        assert!(queue.pop(&retiring).is_none());
    }

    #[test]
    fn test_retiring_worker_exits_even_with_queued_work() {
        let queue = DualQueue::new();
        let retiring = AtomicBool::new(true);

        queue.push(tagged(1).0).unwrap();
        assert!(queue.pop(&retiring).is_none());
        assert_eq!(queue.len(), 1);
    }
}
