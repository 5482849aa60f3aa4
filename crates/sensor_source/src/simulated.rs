//! Simulated helmet sensors
//!
//! Implements `SensorSource`, drawing each worker's compliance from an
//! independent biased coin flip on every poll.
//! Used for demos and testing without physical devices.

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use contracts::{SensorReading, SensorSource, Sweep, WorkerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use crate::error::{Result, SensorSourceError};

/// Probability that a simulated worker is wearing a helmet
pub const DEFAULT_COMPLIANCE_PROBABILITY: f64 = 0.7;

/// Simulated sensor fleet
///
/// Each worker, on each poll, is compliant with probability `p`,
/// independently of other workers and of previous polls.
pub struct SimulatedSource {
    name: String,
    compliance_probability: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedSource {
    /// Create a simulator seeded from the OS
    pub fn new(compliance_probability: f64) -> Result<Self> {
        Self::with_rng(compliance_probability, StdRng::from_os_rng())
    }

    /// Create a reproducible simulator
    pub fn seeded(compliance_probability: f64, seed: u64) -> Result<Self> {
        Self::with_rng(compliance_probability, StdRng::seed_from_u64(seed))
    }

    fn with_rng(compliance_probability: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&compliance_probability) {
            return Err(SensorSourceError::InvalidProbability {
                value: compliance_probability,
            });
        }
        Ok(Self {
            name: "simulated".to_string(),
            compliance_probability,
            rng: Mutex::new(rng),
        })
    }

    pub fn compliance_probability(&self) -> f64 {
        self.compliance_probability
    }

    fn sample(&self, workers: &[WorkerId]) -> Sweep {
        let timestamp = Utc::now();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut sweep = Sweep::with_capacity(workers.len());

        for worker_id in workers {
            let compliant = rng.random_bool(self.compliance_probability);
            sweep.record(SensorReading::new(worker_id.clone(), compliant, timestamp));
        }
        sweep
    }
}

impl SensorSource for SimulatedSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "simulated_source_poll",
        skip(self, workers),
        fields(workers = workers.len())
    )]
    async fn poll(&self, workers: &[WorkerId]) -> Sweep {
        let sweep = self.sample(workers);
        debug!(
            readings = sweep.readings.len(),
            p = self.compliance_probability,
            "simulated sweep"
        );
        sweep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Roster;

    #[tokio::test]
    async fn test_one_reading_per_worker() {
        let source = SimulatedSource::seeded(0.7, 1).unwrap();
        let roster = Roster::synthetic(20);

        let sweep = source.poll(&roster).await;

        assert_eq!(sweep.readings.len(), 20);
        assert!(sweep.unavailable.is_empty());
        for worker in roster.iter() {
            assert_eq!(&sweep.readings[worker].worker_id, worker);
        }
    }

    #[tokio::test]
    async fn test_compliance_fraction_converges() {
        let source = SimulatedSource::seeded(0.7, 42).unwrap();
        let worker = [WorkerId::from("Worker 1")];
        let polls = 100_000;

        let mut compliant = 0u32;
        for _ in 0..polls {
            let sweep = source.poll(&worker).await;
            if sweep.readings["Worker 1"].compliant {
                compliant += 1;
            }
        }

        let fraction = compliant as f64 / polls as f64;
        assert!((fraction - 0.7).abs() < 0.01, "fraction = {fraction}");
    }

    #[tokio::test]
    async fn test_extreme_probabilities() {
        let roster = Roster::synthetic(50);

        let always = SimulatedSource::seeded(1.0, 3).unwrap();
        let sweep = always.poll(&roster).await;
        assert!(sweep.readings.values().all(|r| r.compliant));

        let never = SimulatedSource::seeded(0.0, 3).unwrap();
        let sweep = never.poll(&roster).await;
        assert!(sweep.readings.values().all(|r| !r.compliant));
    }

    #[tokio::test]
    async fn test_seeded_is_reproducible() {
        let roster = Roster::synthetic(20);
        let a = SimulatedSource::seeded(0.5, 9).unwrap().poll(&roster).await;
        let b = SimulatedSource::seeded(0.5, 9).unwrap().poll(&roster).await;
        assert_eq!(a.compliance(), b.compliance());
    }

    #[test]
    fn test_rejects_invalid_probability() {
        assert!(matches!(
            SimulatedSource::new(1.5),
            Err(SensorSourceError::InvalidProbability { .. })
        ));
        assert!(SimulatedSource::new(f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let source = SimulatedSource::new(DEFAULT_COMPLIANCE_PROBABILITY).unwrap();
        let sweep = source.poll(&[]).await;
        assert!(sweep.is_empty());
    }
}
