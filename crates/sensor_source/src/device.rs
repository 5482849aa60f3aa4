//! Device-backed sensor source
//!
//! Queries every worker's physical device concurrently. Each query is
//! bounded by a timeout; a device that errors or does not answer in time is
//! reported as unavailable for this sweep only.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use contracts::{SensorReading, SensorSource, Sweep, WorkerId};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

use crate::error::{Result, SensorSourceError};

/// Per-device query budget
pub const DEFAULT_DEVICE_TIMEOUT: Duration = Duration::from_secs(1);

/// Reads one worker's helmet device
///
/// Implemented by transport adapters (serial, BLE gateway, MQTT bridge...).
#[trait_variant::make(DeviceProbe: Send)]
pub trait LocalDeviceProbe {
    /// Returns whether the helmet is currently worn
    async fn read(&self, worker_id: &WorkerId) -> Result<bool>;
}

/// Hardware-backed source
pub struct DeviceSource<P> {
    name: String,
    probe: Arc<P>,
    device_timeout: Duration,
}

impl<P> DeviceSource<P>
where
    P: DeviceProbe + Sync + 'static,
{
    /// Create a device source with the default timeout
    pub fn new(name: impl Into<String>, probe: P) -> Self {
        Self::with_timeout(name, probe, DEFAULT_DEVICE_TIMEOUT)
    }

    pub fn with_timeout(name: impl Into<String>, probe: P, device_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            probe: Arc::new(probe),
            device_timeout,
        }
    }

    pub fn device_timeout(&self) -> Duration {
        self.device_timeout
    }

    async fn read_one(
        probe: Arc<P>,
        worker_id: WorkerId,
        device_timeout: Duration,
    ) -> (WorkerId, Result<bool>) {
        let result = match timeout(device_timeout, probe.read(&worker_id)).await {
            Ok(result) => result,
            Err(_) => Err(SensorSourceError::Timeout {
                worker_id: worker_id.to_string(),
                timeout_ms: device_timeout.as_millis() as u64,
            }),
        };
        (worker_id, result)
    }
}

impl<P> SensorSource for DeviceSource<P>
where
    P: DeviceProbe + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "device_source_poll",
        skip(self, workers),
        fields(source = %self.name, workers = workers.len())
    )]
    async fn poll(&self, workers: &[WorkerId]) -> Sweep {
        let mut tasks = JoinSet::new();
        for worker_id in workers {
            tasks.spawn(Self::read_one(
                Arc::clone(&self.probe),
                worker_id.clone(),
                self.device_timeout,
            ));
        }

        let mut sweep = Sweep::with_capacity(workers.len());
        let mut answered = Vec::with_capacity(workers.len());

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((worker_id, Ok(compliant))) => {
                    answered.push(worker_id.clone());
                    sweep.record(SensorReading::new(worker_id, compliant, Utc::now()));
                }
                Ok((worker_id, Err(e))) => {
                    let unavailable = e.into_unavailable(&worker_id);
                    warn!(worker_id = %worker_id, error = %unavailable, "Sensor unavailable");
                    answered.push(worker_id.clone());
                    sweep.mark_unavailable(worker_id, unavailable.to_string());
                }
                Err(e) => {
                    error!(error = ?e, "Device task panicked");
                }
            }
        }

        // A panicked task loses its worker id; recover it from the roster
        if answered.len() < workers.len() {
            for worker_id in workers {
                if !answered.contains(worker_id) {
                    sweep.mark_unavailable(worker_id.clone(), "device task aborted");
                }
            }
        }

        debug!(
            readings = sweep.readings.len(),
            unavailable = sweep.unavailable.len(),
            "device sweep complete"
        );
        sweep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::time::sleep;

    /// Scripted device behaviour per worker
    #[derive(Clone, Copy)]
    enum Behaviour {
        Worn,
        NotWorn,
        Hang,
        Fail,
    }

    struct MockProbe {
        behaviours: HashMap<&'static str, Behaviour>,
    }

    impl DeviceProbe for MockProbe {
        async fn read(&self, worker_id: &WorkerId) -> Result<bool> {
            match self.behaviours.get(worker_id.as_str()).copied() {
                Some(Behaviour::Worn) => Ok(true),
                Some(Behaviour::NotWorn) => Ok(false),
                Some(Behaviour::Hang) => {
                    sleep(Duration::from_secs(60)).await;
                    Ok(true)
                }
                Some(Behaviour::Fail) | None => {
                    Err(SensorSourceError::probe(worker_id.as_str(), "no carrier"))
                }
            }
        }
    }

    fn source(behaviours: &[(&'static str, Behaviour)]) -> DeviceSource<MockProbe> {
        DeviceSource::with_timeout(
            "devices",
            MockProbe {
                behaviours: behaviours.iter().copied().collect(),
            },
            Duration::from_millis(100),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_all_devices() {
        let source = source(&[("A", Behaviour::Worn), ("B", Behaviour::NotWorn)]);
        let workers = [WorkerId::from("A"), WorkerId::from("B")];

        let sweep = source.poll(&workers).await;

        assert_eq!(sweep.readings.len(), 2);
        assert!(sweep.readings["A"].compliant);
        assert!(!sweep.readings["B"].compliant);
        assert!(sweep.unavailable.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_device_times_out_alone() {
        let source = source(&[("A", Behaviour::Worn), ("B", Behaviour::Hang)]);
        let workers = [WorkerId::from("A"), WorkerId::from("B")];

        let sweep = source.poll(&workers).await;

        assert_eq!(sweep.readings.len(), 1);
        assert!(sweep.readings["A"].compliant);
        assert_eq!(sweep.unavailable.len(), 1);
        assert_eq!(sweep.unavailable[0].worker_id, "B");
        assert!(sweep.unavailable[0].reason.contains("sensor unavailable"));
        assert!(sweep.unavailable[0].reason.contains("timed out after 100ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_device_is_unavailable() {
        let source = source(&[("A", Behaviour::Fail), ("B", Behaviour::Worn)]);
        let workers = [WorkerId::from("A"), WorkerId::from("B")];

        let sweep = source.poll(&workers).await;

        assert_eq!(sweep.len(), 2);
        assert_eq!(sweep.unavailable[0].worker_id, "A");
        assert!(sweep.unavailable[0].reason.contains("no carrier"));
        assert!(!sweep.compliance().contains_key("A"));
    }
}
