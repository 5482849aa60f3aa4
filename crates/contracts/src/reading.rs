//! SensorReading - SensorSource 输出
//!
//! 单个工人的头盔传感器读数，以及一次轮询 (sweep) 的完整结果。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::WorkerId;

/// 传感器读数
///
/// 每次轮询重新生成，聚合后即丢弃。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// 工人 ID
    pub worker_id: WorkerId,

    /// 是否佩戴头盔
    pub compliant: bool,

    /// 读数时间戳
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn new(worker_id: WorkerId, compliant: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            worker_id,
            compliant,
            timestamp,
        }
    }
}

/// 无法读取的传感器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnavailableSensor {
    pub worker_id: WorkerId,
    pub reason: String,
}

/// 一次轮询的结果
///
/// 每个名册中的工人恰好对应 `readings` 或 `unavailable` 中的一项。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sweep {
    /// 成功读取的读数 (worker_id -> reading)
    pub readings: HashMap<WorkerId, SensorReading>,

    /// 本次无法读取的传感器
    pub unavailable: Vec<UnavailableSensor>,
}

impl Sweep {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: HashMap::with_capacity(capacity),
            unavailable: Vec::new(),
        }
    }

    /// Record a successful reading
    pub fn record(&mut self, reading: SensorReading) {
        self.readings.insert(reading.worker_id.clone(), reading);
    }

    /// Record a worker whose sensor could not be read
    pub fn mark_unavailable(&mut self, worker_id: WorkerId, reason: impl Into<String>) {
        self.unavailable.push(UnavailableSensor {
            worker_id,
            reason: reason.into(),
        });
    }

    /// Compliance mapping consumed by the aggregator
    pub fn compliance(&self) -> HashMap<WorkerId, bool> {
        self.readings
            .iter()
            .map(|(id, reading)| (id.clone(), reading.compliant))
            .collect()
    }

    /// Number of workers covered by this sweep (read or unavailable)
    pub fn len(&self) -> usize {
        self.readings.len() + self.unavailable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_compliance_mapping() {
        let now = Utc::now();
        let mut sweep = Sweep::with_capacity(3);
        sweep.record(SensorReading::new("A".into(), true, now));
        sweep.record(SensorReading::new("B".into(), false, now));
        sweep.mark_unavailable("C".into(), "timeout");

        let compliance = sweep.compliance();
        assert_eq!(compliance.len(), 2);
        assert_eq!(compliance.get("A"), Some(&true));
        assert_eq!(compliance.get("B"), Some(&false));
        assert!(!compliance.contains_key("C"));
        assert_eq!(sweep.len(), 3);
    }
}
