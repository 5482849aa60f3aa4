//! Per-viewer delivery counters
//!
//! Updated by the publisher (delivered / dropped / queue depth) and by sink
//! workers (write / failure). All loads and stores are `Relaxed`; the values
//! are for reporting only.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering::Relaxed};

#[derive(Debug, Default)]
pub struct ViewerMetrics {
    /// Queue depth right after the last delivery
    queue_len: AtomicUsize,
    delivered_count: AtomicU64,
    /// Snapshots missed because the queue was full
    dropped_count: AtomicU64,
    /// Sink viewers only
    write_count: AtomicU64,
    /// Sink viewers only
    failure_count: AtomicU64,
}

impl ViewerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Relaxed);
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Relaxed)
    }

    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Relaxed)
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Relaxed)
    }

    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            delivered_count: self.delivered_count(),
            dropped_count: self.dropped_count(),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub delivered_count: u64,
    pub dropped_count: u64,
    pub write_count: u64,
    pub failure_count: u64,
}

impl MetricsSnapshot {
    /// Percentage of published snapshots this viewer missed
    pub fn drop_rate(&self) -> f64 {
        let offered = self.delivered_count + self.dropped_count;
        if offered == 0 {
            0.0
        } else {
            self.dropped_count as f64 / offered as f64 * 100.0
        }
    }
}
