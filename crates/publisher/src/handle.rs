//! SinkHandle - runs a sink as a viewer with its own queue and worker task

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use contracts::SnapshotSink;

use crate::metrics::ViewerMetrics;
use crate::publisher::{SnapshotPublisher, Subscription, ViewerId};

/// Handle to a running sink worker
#[derive(Debug)]
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Viewer id of the sink's subscription
    viewer_id: ViewerId,
    /// Publisher the sink is subscribed to
    publisher: SnapshotPublisher,
    /// Shared metrics
    metrics: Arc<ViewerMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Subscribe `sink` to `publisher` and spawn its worker task
    pub fn spawn<S: SnapshotSink + Send + 'static>(
        sink: S,
        publisher: &SnapshotPublisher,
        queue_capacity: usize,
    ) -> Self {
        let name = sink.name().to_string();
        let subscription = publisher.subscribe(queue_capacity);
        let viewer_id = subscription.id();
        let metrics = Arc::clone(subscription.metrics());

        let worker_name = name.clone();
        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, subscription, worker_name).await;
        });

        Self {
            name,
            viewer_id,
            publisher: publisher.clone(),
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn viewer_id(&self) -> ViewerId {
        self.viewer_id
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<ViewerMetrics> {
        &self.metrics
    }

    /// Unsubscribe, drain the queue, then flush and close the sink
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        self.publisher.unsubscribe(self.viewer_id);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes snapshots and writes to the sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, subscription),
    fields(sink = %name, viewer = subscription.id())
)]
async fn sink_worker<S: SnapshotSink>(mut sink: S, mut subscription: Subscription, name: String) {
    debug!(sink = %name, "Sink worker started");
    let metrics = Arc::clone(subscription.metrics());

    while let Some(snapshot) = subscription.recv().await {
        match sink.write(&snapshot).await {
            Ok(()) => metrics.inc_write_count(),
            Err(e) => {
                metrics.inc_failure_count();
                error!(sink = %name, tick = snapshot.tick, error = %e, "Write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
