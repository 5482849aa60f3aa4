//! Monitor orchestrator - wires source, scheduler, publisher and sinks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{MonitorBlueprint, SourceConfig, SourceKind};
use publisher::{spawn_sinks, SinkHandle, SnapshotPublisher};
use scheduler::RefreshScheduler;
use sensor_source::SimulatedSource;
use tracing::{info, warn};

use super::{BoardSink, MonitorStats};

/// Board viewer queue depth
const BOARD_QUEUE_CAPACITY: usize = 4;

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// The validated blueprint
    pub blueprint: MonitorBlueprint,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Render the status board on stdout
    pub board: bool,
}

/// Main monitor orchestrator
pub struct Monitor {
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the timeout elapses or the tick limit
    /// is reached
    ///
    /// Every stop path is graceful: the refresh in flight completes and every
    /// sink drains its queue before returning.
    pub async fn run<F>(self, shutdown: F) -> Result<MonitorStats>
    where
        F: Future<Output = ()>,
    {
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::install_prometheus_exporter(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let roster = blueprint.fleet.roster().context("Invalid fleet roster")?;
        let source = build_source(&blueprint.source)?;

        info!("Setting up publisher...");
        let publisher = SnapshotPublisher::new();
        if blueprint.sinks.is_empty() && !self.config.board {
            warn!("No sinks configured - snapshots are only kept as the current snapshot");
        }

        // must precede spawn_sinks: a construction error returns with no sink task alive
        let scheduler = RefreshScheduler::new(
            blueprint.scheduler.clone(),
            roster,
            source,
            publisher.clone(),
        )
        .context("Failed to create scheduler")?;

        let mut handles = spawn_sinks(&blueprint.sinks, &publisher)
            .await
            .context("Failed to create sinks")?;
        if self.config.board {
            handles.push(SinkHandle::spawn(
                BoardSink::stdout(),
                &publisher,
                BOARD_QUEUE_CAPACITY,
            ));
        }
        info!(active_sinks = handles.len(), "Publisher started");

        let handle = scheduler.handle();
        let stopped = handle.cancellation_token();
        let task = scheduler.spawn();

        let timeout = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = stopped.cancelled() => {}
            _ = shutdown => handle.stop(),
            _ = timeout => {
                warn!(timeout_secs = ?self.config.timeout.map(|t| t.as_secs()), "Monitor timed out");
                handle.stop();
            }
        }

        let scheduler_stats = task.await.context("Scheduler task failed")?;

        info!("Shutting down sinks...");
        let mut sink_metrics = Vec::with_capacity(handles.len());
        for handle in handles {
            let name = handle.name().to_string();
            let metrics = Arc::clone(handle.metrics());
            handle.shutdown().await;
            sink_metrics.push((name, metrics.snapshot()));
        }

        let stats = MonitorStats::new(scheduler_stats, sink_metrics);
        info!(
            ticks = stats.scheduler.ticks,
            rate = format!("{:.3}", stats.scheduler.tick_rate()),
            "Monitor shutdown complete"
        );
        Ok(stats)
    }
}

/// Build the sensor source described by the configuration
fn build_source(config: &SourceConfig) -> Result<SimulatedSource> {
    match config.kind {
        SourceKind::Simulated => {
            let source = match config.seed {
                Some(seed) => SimulatedSource::seeded(config.compliance_probability, seed),
                None => SimulatedSource::new(config.compliance_probability),
            }
            .context("Failed to create simulated source")?;
            info!(
                p = config.compliance_probability,
                seed = ?config.seed,
                "Simulated sensor source ready"
            );
            Ok(source)
        }
    }
}
