//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// In-process counters for one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Age tasks served from the cache
    cache_hits: AtomicU64,
    /// Age tasks that needed a single-key lookup
    cache_misses: AtomicU64,
    /// Batch calls issued by the preloader
    batch_calls: AtomicU64,
    /// Batch calls that failed
    batch_failures: AtomicU64,
    /// Tasks acknowledged by the sink
    dispatched: AtomicU64,
    /// Tasks that failed anywhere along the way
    failed: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Account for one preload pass
    pub fn add_batch_calls(&self, calls: u64, failures: u64) {
        self.batch_calls.fetch_add(calls, Ordering::Relaxed);
        self.batch_failures.fetch_add(failures, Ordering::Relaxed);
    }

    pub fn inc_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            batch_calls: self.batch_calls.load(Ordering::Relaxed),
            batch_failures: self.batch_failures.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub batch_calls: u64,
    pub batch_failures: u64,
    pub dispatched: u64,
    pub failed: u64,
}

impl MetricsSnapshot {
    /// Fraction of age tasks served from the cache, `None` before any age task
    pub fn cache_hit_ratio(&self) -> Option<f64> {
        let total = self.cache_hits + self.cache_misses;
        (total > 0).then(|| self.cache_hits as f64 / total as f64)
    }
}
