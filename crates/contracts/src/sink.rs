//! SnapshotSink trait - viewer output interface
//!
//! Defines the abstract interface for snapshot sinks.

use crate::{ContractError, FleetSnapshot};

/// Snapshot output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(SnapshotSink: Send)]
pub trait LocalSnapshotSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one snapshot
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, snapshot: &FleetSnapshot) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
