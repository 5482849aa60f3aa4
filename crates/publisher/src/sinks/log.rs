//! LogSink - logs snapshot summary via tracing

use contracts::{ContractError, FleetSnapshot, SnapshotSink};
use tracing::{info, instrument};

/// Sink that logs snapshot summaries
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_snapshot_summary(&self, snapshot: &FleetSnapshot) {
        info!(
            sink = %self.name,
            tick = snapshot.tick,
            workers = snapshot.fleet_size(),
            non_compliant = snapshot.non_compliant.len(),
            missing = snapshot.missing.len(),
            danger_rate = snapshot.danger_rate,
            "{} | {}",
            snapshot.danger_rate_label(),
            snapshot.non_compliant_summary()
        );
    }
}

impl SnapshotSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name, tick = snapshot.tick)
    )]
    async fn write(&mut self, snapshot: &FleetSnapshot) -> Result<(), ContractError> {
        self.log_snapshot_summary(snapshot);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let snapshot = FleetSnapshot {
            tick: 1,
            timestamp: Utc::now(),
            statuses: Vec::new(),
            non_compliant: Vec::new(),
            missing: Vec::new(),
            danger_rate: 0.0,
        };

        assert!(sink.write(&snapshot).await.is_ok());
        assert_eq!(sink.name(), "test_log");
    }
}
