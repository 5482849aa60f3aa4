//! SensorSource trait - Sensor data source abstraction
//!
//! Defines a unified interface for helmet sensor sources, decoupling the
//! scheduler from concrete sensor implementations.
//! Supports unified handling of simulated and device-backed sources.

use crate::{Sweep, WorkerId};

/// Sensor data source trait
///
/// Abstracts the common behavior of simulated and hardware-backed sources.
/// All sources implement this trait for use by the refresh scheduler.
///
/// # Contract
///
/// 1. **Total**: `poll` never fails as a whole; a worker that cannot be read
///    is reported in [`Sweep::unavailable`]
/// 2. **Complete**: every roster ID appears exactly once, either as a reading
///    or as unavailable
/// 3. **Keyed**: readings are a mapping, so aggregation does not depend on
///    the order the source answers in
///
/// # Example
///
/// ```ignore
/// let source = SimulatedSource::new(0.7);
/// let sweep = source.poll(&roster).await;
/// println!("read {} of {}", sweep.readings.len(), roster.len());
/// ```
#[trait_variant::make(SensorSource: Send)]
pub trait LocalSensorSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Produce one reading per worker ID
    ///
    /// May suspend (device I/O). Callers needing hard cancellation should
    /// rely on the source's own timeout.
    async fn poll(&self, workers: &[WorkerId]) -> Sweep;
}
