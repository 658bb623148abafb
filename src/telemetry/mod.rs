//! Telemetry and observability subsystem.
//!
//! Pool-wide counters and execution-latency percentiles. Compiled down to
//! no-op stubs when the `telemetry` feature is disabled.

#[cfg(feature = "telemetry")]
pub mod metrics;

#[cfg(feature = "telemetry")]
pub use metrics::{Metrics, MetricsSnapshot};

// Stub implementations when telemetry is disabled
#[cfg(not(feature = "telemetry"))]
pub mod metrics {
    //! No-op metrics stubs.

    /// No-op metrics collector.
    #[derive(Debug, Clone, Default)]
    pub struct Metrics;

    impl Metrics {
        /// Create a no-op collector.
        pub fn new() -> Self {
            Self
        }
        /// Does nothing.
        pub fn record_task_submitted(&self) {}
        /// Does nothing.
        pub fn record_task_execution(&self, _: u64) {}
        /// Does nothing.
        pub fn record_task_panic(&self) {}
        /// Always returns an empty snapshot.
        pub fn snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot::default()
        }
    }

    /// Empty snapshot produced by the no-op collector.
    #[derive(Debug, Clone, Default)]
    pub struct MetricsSnapshot {
        /// Always zero.
        pub tasks_submitted: u64,
        /// Always zero.
        pub tasks_executed: u64,
        /// Always zero.
        pub tasks_panicked: u64,
        /// Always zero.
        pub avg_latency_ns: u64,
        /// Always zero.
        pub p50_latency_ns: u64,
        /// Always zero.
        pub p99_latency_ns: u64,
    }
}

#[cfg(not(feature = "telemetry"))]
pub use metrics::{Metrics, MetricsSnapshot};
