//! SnapshotPublisher - fan-out of fleet snapshots to viewers

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, info, instrument, warn};

use contracts::{ContractError, FleetSnapshot, SinkConfig, SinkType};

use crate::error::PublisherError;
use crate::handle::SinkHandle;
use crate::metrics::{MetricsSnapshot, ViewerMetrics};
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Identifier handed out by `subscribe`
pub type ViewerId = u64;

/// A viewer's end of the fan-out
///
/// Snapshots arrive in publication order. Dropping the subscription
/// detaches the viewer on the next publish.
#[derive(Debug)]
pub struct Subscription {
    id: ViewerId,
    receiver: mpsc::Receiver<Arc<FleetSnapshot>>,
    metrics: Arc<ViewerMetrics>,
}

impl Subscription {
    pub fn id(&self) -> ViewerId {
        self.id
    }

    /// Wait for the next snapshot; `None` once unsubscribed and drained
    pub async fn recv(&mut self) -> Option<Arc<FleetSnapshot>> {
        let snapshot = self.receiver.recv().await;
        self.metrics.set_queue_len(self.receiver.len());
        snapshot
    }

    /// Non-blocking receive
    pub fn try_recv(&mut self) -> Result<Arc<FleetSnapshot>, TryRecvError> {
        let snapshot = self.receiver.try_recv();
        self.metrics.set_queue_len(self.receiver.len());
        snapshot
    }

    pub fn metrics(&self) -> &Arc<ViewerMetrics> {
        &self.metrics
    }
}

/// Outcome of one `publish` call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Viewers that accepted the snapshot
    pub delivered: Vec<ViewerId>,
    /// Viewers whose queue was full (snapshot dropped for them only)
    pub dropped: Vec<ViewerId>,
    /// Viewers found disconnected and removed
    pub disconnected: Vec<ViewerId>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.disconnected.is_empty()
    }
}

#[derive(Debug)]
struct Viewer {
    tx: mpsc::Sender<Arc<FleetSnapshot>>,
    metrics: Arc<ViewerMetrics>,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: ViewerId,
    viewers: BTreeMap<ViewerId, Viewer>,
    last_published: Option<DateTime<Utc>>,
}

/// Fan-out point between the scheduler and its viewers
///
/// Cloning is cheap and every clone shares the same viewer set.
/// `publish` never waits on a viewer; the registry lock is only held for
/// non-blocking sends.
#[derive(Clone, Debug, Default)]
pub struct SnapshotPublisher {
    registry: Arc<Mutex<Registry>>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a viewer with a bounded queue of `capacity` snapshots
    ///
    /// A viewer only receives snapshots published after it subscribed.
    pub fn subscribe(&self, capacity: usize) -> Subscription {
        let (tx, receiver) = mpsc::channel(capacity.max(1));
        let metrics = Arc::new(ViewerMetrics::new());

        let mut registry = self.registry();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.viewers.insert(
            id,
            Viewer {
                tx,
                metrics: Arc::clone(&metrics),
            },
        );
        debug!(viewer = id, capacity, viewers = registry.viewers.len(), "Viewer subscribed");

        Subscription {
            id,
            receiver,
            metrics,
        }
    }

    /// Remove a viewer; returns false if it was not registered
    ///
    /// Snapshots already queued for the viewer stay readable.
    pub fn unsubscribe(&self, id: ViewerId) -> bool {
        let removed = self.registry().viewers.remove(&id).is_some();
        if removed {
            debug!(viewer = id, "Viewer unsubscribed");
        }
        removed
    }

    pub fn viewer_count(&self) -> usize {
        self.registry().viewers.len()
    }

    /// Per-viewer metrics, ordered by viewer id
    pub fn metrics(&self) -> Vec<(ViewerId, MetricsSnapshot)> {
        self.registry()
            .viewers
            .iter()
            .map(|(id, viewer)| (*id, viewer.metrics.snapshot()))
            .collect()
    }

    /// Deliver `snapshot` to every registered viewer
    ///
    /// A viewer with a full queue misses this snapshot; a viewer whose
    /// receiver is gone is removed. Neither affects the other viewers.
    /// Snapshots older than the last one published are rejected.
    #[instrument(
        name = "publisher_publish",
        skip(self, snapshot),
        fields(tick = snapshot.tick)
    )]
    pub fn publish(&self, snapshot: Arc<FleetSnapshot>) -> Result<PublishReport, PublisherError> {
        let mut registry = self.registry();

        if let Some(last) = registry.last_published {
            if snapshot.timestamp < last {
                return Err(PublisherError::OutOfOrder {
                    timestamp: snapshot.timestamp,
                    last,
                });
            }
        }
        registry.last_published = Some(snapshot.timestamp);

        let mut report = PublishReport::default();
        for (id, viewer) in &registry.viewers {
            match viewer.tx.try_send(Arc::clone(&snapshot)) {
                Ok(()) => {
                    viewer.metrics.inc_delivered_count();
                    viewer
                        .metrics
                        .set_queue_len(viewer.tx.max_capacity() - viewer.tx.capacity());
                    report.delivered.push(*id);
                }
                Err(TrySendError::Full(_)) => {
                    viewer.metrics.inc_dropped_count();
                    let failure = ContractError::publish_failure(*id, "viewer queue full");
                    warn!(viewer = id, tick = snapshot.tick, error = %failure, "Snapshot dropped");
                    report.dropped.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    report.disconnected.push(*id);
                }
            }
        }

        for id in &report.disconnected {
            registry.viewers.remove(id);
            info!(viewer = id, "Viewer disconnected, unsubscribed");
        }

        Ok(report)
    }
}

/// Create a sink viewer from configuration
#[instrument(
    name = "publisher_create_sink_handle",
    skip(config, publisher),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub async fn create_sink_handle(
    config: &SinkConfig,
    publisher: &SnapshotPublisher,
) -> Result<SinkHandle, PublisherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, publisher, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| PublisherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, publisher, config.queue_capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| PublisherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, publisher, config.queue_capacity))
        }
    }
}

/// Subscribe every configured sink
///
/// On failure, sinks already started are shut down before returning.
#[instrument(
    name = "publisher_spawn_sinks",
    skip(configs, publisher),
    fields(sink_count = configs.len())
)]
pub async fn spawn_sinks(
    configs: &[SinkConfig],
    publisher: &SnapshotPublisher,
) -> Result<Vec<SinkHandle>, PublisherError> {
    let mut handles = Vec::with_capacity(configs.len());
    for config in configs {
        match create_sink_handle(config, publisher).await {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                for handle in handles {
                    handle.shutdown().await;
                }
                return Err(e);
            }
        }
    }
    Ok(handles)
}
