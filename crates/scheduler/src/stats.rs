//! Scheduler run statistics.

use std::time::Duration;

use observability::FleetMetricsAggregator;

/// Statistics from a scheduler run
#[derive(Debug, Clone, Default)]
pub struct SchedulerStats {
    /// Ticks that triggered a refresh
    pub ticks: u64,

    /// Ticks missed while a refresh was running and merged away
    pub ticks_collapsed: u64,

    /// Snapshots handed to the publisher
    pub snapshots_published: u64,

    /// Per-viewer deliveries dropped on full queues
    pub deliveries_dropped: u64,

    /// Sensor readings reported unavailable
    pub unavailable_readings: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// In-memory fleet metrics
    pub fleet_metrics: FleetMetricsAggregator,
}

impl SchedulerStats {
    /// Refreshes per second over the run
    pub fn tick_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.ticks as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}
