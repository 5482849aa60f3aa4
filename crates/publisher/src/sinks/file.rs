//! FileSink - appends snapshots to a JSON lines file

use contracts::{ContractError, FleetSnapshot, SnapshotSink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Sink that appends one JSON object per snapshot
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Open (or create) the output file in append mode
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let path = params.get("path").ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing 'path' parameter")
        })?;
        Self::new(name, path)
    }

    fn append_line(&mut self, snapshot: &FleetSnapshot) -> std::io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "file sink closed")
        })?;
        serde_json::to_writer(&mut *writer, snapshot)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")
    }
}

impl SnapshotSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name, tick = snapshot.tick)
    )]
    async fn write(&mut self, snapshot: &FleetSnapshot) -> Result<(), ContractError> {
        self.append_line(snapshot).map_err(|e| {
            error!(sink = %self.name, tick = snapshot.tick, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        self.writer = None;
        debug!(sink = %self.name, path = %self.path.display(), "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::WorkerStatus;
    use tempfile::tempdir;

    fn snapshot(tick: u64) -> FleetSnapshot {
        FleetSnapshot {
            tick,
            timestamp: Utc::now(),
            statuses: vec![WorkerStatus {
                worker_id: "Worker 1".into(),
                compliant: false,
            }],
            non_compliant: vec!["Worker 1".into()],
            missing: Vec::new(),
            danger_rate: 100.0,
        }
    }

    #[tokio::test]
    async fn test_file_sink_appends_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("snapshots.jsonl");

        let mut sink = FileSink::new("test_file", &path).unwrap();
        sink.write(&snapshot(1)).await.unwrap();
        sink.write(&snapshot(2)).await.unwrap();
        sink.close().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<FleetSnapshot> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].tick, 1);
        assert_eq!(lines[1].non_compliant[0], "Worker 1");

        assert!(sink.write(&snapshot(3)).await.is_err());
    }

    #[test]
    fn test_file_sink_requires_path() {
        let err = FileSink::from_params("f", &HashMap::new()).err().unwrap();
        assert!(err.to_string().contains("path"));
    }
}
