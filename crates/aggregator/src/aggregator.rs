//! Fleet aggregation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use contracts::{FleetSnapshot, MissingReadingPolicy, WorkerId, WorkerStatus};
use tracing::{instrument, trace};

/// Percentage of `total` that is non-compliant.
///
/// An empty fleet yields the `0.0` sentinel instead of dividing by zero.
pub fn danger_rate(non_compliant: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * non_compliant as f64 / total as f64
    }
}

/// Turns one sweep of readings into a `FleetSnapshot`
///
/// Holds no history; every call is a pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleetAggregator {
    policy: MissingReadingPolicy,
}

impl FleetAggregator {
    pub fn new(policy: MissingReadingPolicy) -> Self {
        Self { policy }
    }

    /// Aggregate, stamping the snapshot with the current time
    pub fn aggregate(
        &self,
        workers: &[WorkerId],
        readings: &HashMap<WorkerId, bool>,
    ) -> FleetSnapshot {
        self.aggregate_at(workers, readings, Utc::now())
    }

    /// Aggregate with an explicit timestamp
    ///
    /// `workers` is the source of truth for membership and order. Readings
    /// for IDs not in `workers` are ignored.
    #[instrument(
        name = "fleet_aggregate",
        skip(self, workers, readings),
        fields(workers = workers.len(), readings = readings.len(), policy = ?self.policy)
    )]
    pub fn aggregate_at(
        &self,
        workers: &[WorkerId],
        readings: &HashMap<WorkerId, bool>,
        timestamp: DateTime<Utc>,
    ) -> FleetSnapshot {
        let mut statuses = Vec::with_capacity(workers.len());
        let mut non_compliant = Vec::new();
        let mut missing = Vec::new();

        for worker_id in workers {
            let compliant = match readings.get(worker_id) {
                Some(&compliant) => compliant,
                None => {
                    missing.push(worker_id.clone());
                    match self.policy {
                        MissingReadingPolicy::FailSafe => false,
                        MissingReadingPolicy::Exclude => continue,
                    }
                }
            };

            if !compliant {
                non_compliant.push(worker_id.clone());
            }
            statuses.push(WorkerStatus {
                worker_id: worker_id.clone(),
                compliant,
            });
        }

        let danger_rate = danger_rate(non_compliant.len(), statuses.len());

        trace!(
            counted = statuses.len(),
            non_compliant = non_compliant.len(),
            missing = missing.len(),
            danger_rate,
            "fleet aggregated"
        );

        FleetSnapshot {
            tick: 0,
            timestamp,
            statuses,
            non_compliant,
            missing,
            danger_rate,
        }
    }
}
