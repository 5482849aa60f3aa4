//! RefreshScheduler - periodic poll / aggregate / publish loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aggregator::FleetAggregator;
use chrono::{DateTime, Utc};
use contracts::{FleetSnapshot, Roster, SchedulerConfig, SensorSource};
use observability::{
    record_publish_outcome, record_refresh_latency_ms, record_sensor_unavailable,
    record_snapshot_metrics, record_ticks_collapsed, record_viewer_count,
};
use publisher::SnapshotPublisher;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::SchedulerError;
use crate::handle::{SchedulerHandle, SnapshotReader};
use crate::stats::SchedulerStats;

/// Drives one refresh per tick
///
/// Ticks never overlap: the refresh runs inline in the timer task, and ticks
/// missed while it runs collapse into a single pending tick.
pub struct RefreshScheduler<S> {
    config: SchedulerConfig,
    roster: Roster,
    source: S,
    aggregator: FleetAggregator,
    publisher: SnapshotPublisher,
    current: watch::Sender<Option<Arc<FleetSnapshot>>>,
    refreshing: Arc<AtomicBool>,
    cancel: CancellationToken,
    last_timestamp: Option<DateTime<Utc>>,
}

impl<S> RefreshScheduler<S>
where
    S: SensorSource + Sync,
{
    /// Create a scheduler
    ///
    /// # Errors
    /// `InvalidConfig` if the tick period is zero or `max_ticks` is `Some(0)`.
    pub fn new(
        config: SchedulerConfig,
        roster: Roster,
        source: S,
        publisher: SnapshotPublisher,
    ) -> Result<Self, SchedulerError> {
        if config.tick_period_ms == 0 {
            return Err(SchedulerError::invalid_config(
                "tick_period_ms",
                "tick period must be > 0",
            ));
        }
        if config.max_ticks == Some(0) {
            return Err(SchedulerError::invalid_config(
                "max_ticks",
                "max_ticks must be > 0 when set",
            ));
        }

        let (current, _) = watch::channel(None);
        Ok(Self {
            aggregator: FleetAggregator::new(config.missing_reading_policy),
            config,
            roster,
            source,
            publisher,
            current,
            refreshing: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            last_timestamp: None,
        })
    }

    /// Handle for stopping the scheduler and reading its state
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            cancel: self.cancel.clone(),
            refreshing: Arc::clone(&self.refreshing),
            reader: SnapshotReader::new(self.current.subscribe()),
        }
    }

    pub fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Run until stopped or `max_ticks` is reached
    ///
    /// The first tick fires immediately. On return the handle reports
    /// stopped, whatever ended the run.
    #[instrument(
        name = "scheduler_run",
        skip(self),
        fields(
            source = self.source.name(),
            workers = self.roster.len(),
            period_ms = self.config.tick_period_ms
        )
    )]
    pub async fn run(mut self) -> SchedulerStats {
        let period = self.config.tick_period();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let started = Instant::now();
        let mut stats = SchedulerStats::default();

        info!(
            policy = ?self.config.missing_reading_policy,
            max_ticks = ?self.config.max_ticks,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(ticks = stats.ticks, "Stop requested");
                    break;
                }
                _ = ticker.tick() => {}
            }

            stats.ticks += 1;
            self.refresh(stats.ticks, &mut stats).await;

            let collapsed = collapsed_since(started, period, &stats);
            if collapsed > 0 {
                debug!(collapsed, "Ticks missed during refresh collapsed");
                stats.ticks_collapsed += collapsed;
                stats.fleet_metrics.record_collapsed(collapsed);
                record_ticks_collapsed(collapsed);
            }

            if let Some(max) = self.config.max_ticks {
                if stats.ticks >= max {
                    info!(ticks = stats.ticks, "Reached max ticks limit");
                    break;
                }
            }
        }

        stats.duration = started.elapsed();
        self.cancel.cancel();
        info!(
            ticks = stats.ticks,
            collapsed = stats.ticks_collapsed,
            published = stats.snapshots_published,
            duration_secs = stats.duration.as_secs_f64(),
            "Scheduler stopped"
        );
        stats
    }

    /// One poll / aggregate / publish cycle
    #[instrument(name = "scheduler_refresh", skip(self, stats))]
    async fn refresh(&mut self, tick: u64, stats: &mut SchedulerStats) {
        self.refreshing.store(true, Ordering::Release);
        let refresh_start = Instant::now();

        let sweep = self.source.poll(&self.roster).await;
        for unavailable in &sweep.unavailable {
            warn!(
                worker_id = %unavailable.worker_id,
                reason = %unavailable.reason,
                "No reading this tick"
            );
            record_sensor_unavailable(&unavailable.worker_id);
        }
        stats.unavailable_readings += sweep.unavailable.len() as u64;

        let timestamp = self.next_timestamp();
        let mut snapshot = self
            .aggregator
            .aggregate_at(&self.roster, &sweep.compliance(), timestamp);
        snapshot.tick = tick;
        let snapshot = Arc::new(snapshot);

        self.current.send_replace(Some(Arc::clone(&snapshot)));
        record_snapshot_metrics(&snapshot);
        stats.fleet_metrics.update(&snapshot);

        match self.publisher.publish(Arc::clone(&snapshot)) {
            Ok(report) => {
                stats.snapshots_published += 1;
                stats.deliveries_dropped += report.dropped.len() as u64;
                stats.fleet_metrics.record_dropped(report.dropped.len());
                record_publish_outcome(
                    report.delivered.len(),
                    report.dropped.len(),
                    report.disconnected.len(),
                );
            }
            Err(e) => error!(error = %e, "Publish rejected"),
        }
        record_viewer_count(self.publisher.viewer_count());

        let latency_ms = refresh_start.elapsed().as_secs_f64() * 1000.0;
        record_refresh_latency_ms(latency_ms);
        stats.fleet_metrics.record_latency_ms(latency_ms);

        debug!(
            danger_rate = snapshot.danger_rate,
            non_compliant = snapshot.non_compliant.len(),
            missing = snapshot.missing.len(),
            latency_ms,
            "Snapshot refreshed"
        );
        self.refreshing.store(false, Ordering::Release);
    }

    /// Wall-clock stamp, clamped so snapshots never go back in time
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}

impl<S> RefreshScheduler<S>
where
    S: SensorSource + Sync + 'static,
{
    /// Spawn the scheduler as a background task
    pub fn spawn(self) -> JoinHandle<SchedulerStats> {
        tokio::spawn(self.run())
    }
}

/// Ticks due by now that neither fired nor were already counted as
/// collapsed, minus the one left pending.
fn collapsed_since(started: Instant, period: Duration, stats: &SchedulerStats) -> u64 {
    let due = (started.elapsed().as_nanos() / period.as_nanos()) as u64 + 1;
    due.saturating_sub(stats.ticks + stats.ticks_collapsed + 1)
}
