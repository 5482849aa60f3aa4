//! Read and control access to a running scheduler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::FleetSnapshot;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick
    Idle,
    /// Polling, aggregating or publishing
    Refreshing,
}

/// Shared view of the current snapshot
///
/// The scheduler swaps in a complete snapshot per tick; readers never see a
/// partially built one.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Option<Arc<FleetSnapshot>>>,
}

impl SnapshotReader {
    pub(crate) fn new(rx: watch::Receiver<Option<Arc<FleetSnapshot>>>) -> Self {
        Self { rx }
    }

    /// Latest snapshot, `None` before the first refresh completes
    pub fn latest(&self) -> Option<Arc<FleetSnapshot>> {
        self.rx.borrow().clone()
    }

    /// Wait for a snapshot newer than the last one seen by this reader
    ///
    /// Returns `None` once the scheduler has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<FleetSnapshot>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }
}

/// Cloneable control handle
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    pub(crate) cancel: CancellationToken,
    pub(crate) refreshing: Arc<AtomicBool>,
    pub(crate) reader: SnapshotReader,
}

impl SchedulerHandle {
    /// Request a stop
    ///
    /// No tick starts after this call. A refresh already in flight runs to
    /// completion and its snapshot is still published.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// True once a stop was requested or the run ended on its own
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> SchedulerState {
        if self.refreshing.load(Ordering::Acquire) {
            SchedulerState::Refreshing
        } else {
            SchedulerState::Idle
        }
    }

    pub fn reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    /// Token cancelled when the scheduler stops for any reason
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
