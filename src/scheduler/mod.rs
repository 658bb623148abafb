//! Task queueing subsystem.
//!
//! One lock, one condition, two FIFO lanes. A routing flag decides at
//! submission time which lane receives a new envelope; workers always drain
//! the priority lane before the normal one.

pub(crate) mod queue;

pub(crate) use queue::DualQueue;
