//! Harvest dispatch metrics and statistics.
//!
//! Tracks harvest throughput, failure rates, and in-flight external calls.

use std::sync::atomic::{AtomicU64, Ordering};

/// Harvest metrics updated by the scheduler's harvest tasks.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct HarvestMetrics {
    /// Harvests handed to the farming facade
    dispatched: AtomicU64,

    /// Harvests that succeeded and were recorded on a live worker
    succeeded: AtomicU64,

    /// Harvests that failed (facade error, missing session, no tool)
    failed: AtomicU64,

    /// Successful harvests whose worker was removed before completion
    discarded: AtomicU64,

    /// External calls currently outstanding
    in_flight: AtomicU64,

    /// Peak in-flight count observed
    peak_in_flight: AtomicU64,
}

impl HarvestMetrics {
    /// Creates a new empty metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a dispatch and tracks the in-flight peak.
    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        let depth = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;

        // Update peak using compare-and-swap loop
        let mut current_peak = self.peak_in_flight.load(Ordering::Relaxed);
        while depth > current_peak {
            match self.peak_in_flight.compare_exchange_weak(
                current_peak,
                depth,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current_peak = actual,
            }
        }
    }

    /// Marks one dispatched call as finished, whatever its outcome.
    pub fn record_settled(&self) {
        // Saturate instead of wrapping if settle ever outpaces dispatch.
        let _ = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn peak_in_flight(&self) -> u64 {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    /// Returns success rate as a percentage (0-100).
    pub fn success_rate(&self) -> f64 {
        let succeeded = self.succeeded();
        let total = succeeded + self.failed();

        if total == 0 {
            100.0
        } else {
            (succeeded as f64 / total as f64) * 100.0
        }
    }

    /// Creates a snapshot of all metrics for display/logging.
    ///
    /// Note: individual fields are read atomically but the snapshot as a
    /// whole may be inconsistent while harvests are completing.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched: self.dispatched(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            discarded: self.discarded(),
            in_flight: self.in_flight(),
            peak_in_flight: self.peak_in_flight(),
            success_rate: self.success_rate(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub discarded: u64,
    pub in_flight: u64,
    pub peak_in_flight: u64,
    pub success_rate: f64,
}
