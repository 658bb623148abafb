//! Metrics collection for pool monitoring.

use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Pool-wide metrics collector
#[derive(Debug)]
pub struct Metrics {
    // Task counters
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_panicked: AtomicU64,

    // Latency histogram (protected by RwLock for interior mutability)
    latency_histogram: RwLock<Histogram<u64>>,

    // Creation time
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        // Create histogram with 3 significant figures and max value of 1 hour in nanoseconds
        let histogram =
            Histogram::new_with_max(3_600_000_000_000, 3).expect("Failed to create histogram");

        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            latency_histogram: RwLock::new(histogram),
            start_time: Instant::now(),
        }
    }

    /// Record an accepted submission
    pub fn record_task_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed execution with its duration
    pub fn record_task_execution(&self, duration_ns: u64) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);

        // Record latency in histogram; never block a worker on contention
        if let Some(mut hist) = self.latency_histogram.try_write() {
            let _ = hist.record(duration_ns);
        }
    }

    /// Record a panicked task
    pub fn record_task_panic(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all collected metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let hist = self.latency_histogram.read();

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            avg_latency_ns: hist.mean() as u64,
            p50_latency_ns: hist.value_at_quantile(0.5),
            p99_latency_ns: hist.value_at_quantile(0.99),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the collector
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Time since the collector was created
    pub uptime: Duration,
    /// Submissions accepted by the pool
    pub tasks_submitted: u64,
    /// Tasks that ran to completion
    pub tasks_executed: u64,
    /// Tasks whose computation panicked
    pub tasks_panicked: u64,
    /// Mean execution latency in nanoseconds
    pub avg_latency_ns: u64,
    /// Median execution latency in nanoseconds
    pub p50_latency_ns: u64,
    /// 99th-percentile execution latency in nanoseconds
    pub p99_latency_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_move() {
        let metrics = Metrics::new();

        metrics.record_task_submitted();
        metrics.record_task_submitted();
        metrics.record_task_execution(1_000);
        metrics.record_task_panic();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.tasks_submitted, 2);
        assert_eq!(snapshot.tasks_executed, 1);
        assert_eq!(snapshot.tasks_panicked, 1);
    }

    #[test]
    fn test_latency_percentiles_recorded() {
        let metrics = Metrics::new();

        for duration_ns in [1_000, 2_000, 4_000, 8_000] {
            metrics.record_task_execution(duration_ns);
        }

        let snapshot = metrics.snapshot();
        assert!(snapshot.p50_latency_ns >= 1_000);
        assert!(snapshot.p99_latency_ns >= snapshot.p50_latency_ns);
    }
}
