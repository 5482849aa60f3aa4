//! FleetSnapshot - Aggregator output
//!
//! Immutable aggregate view of fleet compliance at one point in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::WorkerId;

/// Per-worker status inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub worker_id: WorkerId,
    pub compliant: bool,
}

impl WorkerStatus {
    /// Indicator light for this worker
    pub fn indicator(&self) -> Indicator {
        Indicator::from_compliance(self.compliant)
    }
}

/// Status light shown for a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Helmet on
    Green,
    /// Helmet off (or no reading under the fail-safe policy)
    Red,
}

impl Indicator {
    pub fn from_compliance(compliant: bool) -> Self {
        if compliant {
            Self::Green
        } else {
            Self::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

/// Fleet snapshot
///
/// Built once per tick and shared read-only (`Arc<FleetSnapshot>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Scheduler sequence number (monotonically increasing, 0 outside the scheduler)
    pub tick: u64,

    /// When the snapshot was built
    pub timestamp: DateTime<Utc>,

    /// Worker statuses in roster order
    pub statuses: Vec<WorkerStatus>,

    /// Ordered subsequence of `statuses` with `compliant == false`
    pub non_compliant: Vec<WorkerId>,

    /// Roster workers with no reading this sweep, in roster order
    pub missing: Vec<WorkerId>,

    /// Percentage of `statuses` that is non-compliant, in [0, 100]
    pub danger_rate: f64,
}

impl FleetSnapshot {
    /// Number of workers counted in the danger rate
    pub fn fleet_size(&self) -> usize {
        self.statuses.len()
    }

    /// Count of compliant workers
    pub fn compliant_count(&self) -> usize {
        self.statuses.len() - self.non_compliant.len()
    }

    pub fn is_all_compliant(&self) -> bool {
        self.non_compliant.is_empty()
    }

    /// Line listing non-compliant workers, as shown under the lights
    pub fn non_compliant_summary(&self) -> String {
        if self.non_compliant.is_empty() {
            "All workers are wearing helmets.".to_string()
        } else {
            let names: Vec<&str> = self.non_compliant.iter().map(WorkerId::as_str).collect();
            format!("Workers not wearing helmets: {}", names.join(", "))
        }
    }

    /// `Danger rate: 30.00%`
    pub fn danger_rate_label(&self) -> String {
        format!("Danger rate: {:.2}%", self.danger_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(statuses: &[(&str, bool)]) -> FleetSnapshot {
        let statuses: Vec<WorkerStatus> = statuses
            .iter()
            .map(|(id, compliant)| WorkerStatus {
                worker_id: (*id).into(),
                compliant: *compliant,
            })
            .collect();
        let non_compliant: Vec<WorkerId> = statuses
            .iter()
            .filter(|s| !s.compliant)
            .map(|s| s.worker_id.clone())
            .collect();
        let danger_rate = 100.0 * non_compliant.len() as f64 / statuses.len() as f64;
        FleetSnapshot {
            tick: 1,
            timestamp: Utc::now(),
            statuses,
            non_compliant,
            missing: Vec::new(),
            danger_rate,
        }
    }

    #[test]
    fn test_summary_lines() {
        let snap = snapshot(&[("Worker 1", true), ("Worker 2", false), ("Worker 3", false)]);
        assert_eq!(
            snap.non_compliant_summary(),
            "Workers not wearing helmets: Worker 2, Worker 3"
        );
        assert_eq!(snap.danger_rate_label(), "Danger rate: 66.67%");
        assert_eq!(snap.compliant_count(), 1);
    }

    #[test]
    fn test_all_compliant_summary() {
        let snap = snapshot(&[("Worker 1", true), ("Worker 2", true)]);
        assert!(snap.is_all_compliant());
        assert_eq!(snap.non_compliant_summary(), "All workers are wearing helmets.");
        assert_eq!(snap.danger_rate_label(), "Danger rate: 0.00%");
    }

    #[test]
    fn test_indicator_colors() {
        let snap = snapshot(&[("Worker 1", true), ("Worker 2", false)]);
        assert_eq!(snap.statuses[0].indicator(), Indicator::Green);
        assert_eq!(snap.statuses[1].indicator(), Indicator::Red);
        assert_eq!(Indicator::Red.as_str(), "red");
    }

    #[test]
    fn test_snapshot_serde() {
        let snap = snapshot(&[("Worker 1", false)]);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"danger_rate\":100.0"));
        let parsed: FleetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snap);
    }
}
