//! Monitor run statistics.

use publisher::MetricsSnapshot;
use scheduler::SchedulerStats;

/// Statistics from a monitor run
#[derive(Debug, Clone, Default)]
pub struct MonitorStats {
    /// Scheduler counters and fleet metrics
    pub scheduler: SchedulerStats,

    /// Final per-sink metrics, in configuration order
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

impl MonitorStats {
    pub fn new(scheduler: SchedulerStats, sinks: Vec<(String, MetricsSnapshot)>) -> Self {
        Self { scheduler, sinks }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let s = &self.scheduler;
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Monitor Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", s.duration.as_secs_f64());
        println!("   ├─ Ticks: {}", s.ticks);
        println!("   ├─ Collapsed ticks: {}", s.ticks_collapsed);
        println!("   ├─ Snapshots published: {}", s.snapshots_published);
        println!("   ├─ Unavailable readings: {}", s.unavailable_readings);
        println!("   └─ Dropped deliveries: {}", s.deliveries_dropped);

        let summary = s.fleet_metrics.summary();

        println!("\n🦺 Fleet");
        println!("   ├─ All-compliant ticks: {}", summary.all_compliant_ticks);
        println!(
            "   ├─ Ticks with missing readings: {} ({:.2}%)",
            summary.ticks_with_missing, summary.missing_rate
        );
        println!("   ├─ Danger rate (%): {}", summary.danger_rate);
        println!("   └─ Refresh latency (ms): {}", summary.refresh_latency_ms);

        let top = summary.top_offenders(5);
        if !top.is_empty() {
            println!("\n⚠️  Most Frequently Non-Compliant");
            for (i, (worker, count)) in top.iter().enumerate() {
                let prefix = if i == top.len() - 1 { "└─" } else { "├─" };
                println!("   {} {}: {}", prefix, worker, count);
            }
        }

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, m)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: written={}, failed={}, dropped={} ({:.1}%)",
                    prefix,
                    name,
                    m.write_count,
                    m.failure_count,
                    m.dropped_count,
                    m.drop_rate()
                );
            }
        }

        println!();
    }
}
