//! Terminal status board.
//!
//! One line per worker with a green or red light, followed by the
//! non-compliant summary and the danger rate.

use std::fmt::Write as _;
use std::io::{self, Write};

use contracts::{ContractError, FleetSnapshot, Indicator, SnapshotSink};

/// Sink that renders each snapshot as a text board
pub struct BoardSink<W> {
    name: String,
    out: W,
}

impl BoardSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new("board", io::stdout())
    }
}

impl<W: Write + Send> BoardSink<W> {
    pub fn new(name: impl Into<String>, out: W) -> Self {
        Self {
            name: name.into(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn light(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Green => "\u{1F7E2}",
        Indicator::Red => "\u{1F534}",
    }
}

/// Render a snapshot as board text
pub fn render(snapshot: &FleetSnapshot) -> String {
    let mut board = String::new();
    let _ = writeln!(
        board,
        "── Helmet Status · tick {} · {} ──",
        snapshot.tick,
        snapshot.timestamp.format("%H:%M:%S")
    );
    for status in &snapshot.statuses {
        let _ = writeln!(board, "{} {}", light(status.indicator()), status.worker_id);
    }
    if !snapshot.missing.is_empty() {
        let names: Vec<&str> = snapshot.missing.iter().map(|id| id.as_str()).collect();
        let _ = writeln!(board, "No reading: {}", names.join(", "));
    }
    let _ = writeln!(board, "{}", snapshot.non_compliant_summary());
    let _ = writeln!(board, "{}", snapshot.danger_rate_label());
    board
}

impl<W: Write + Send> SnapshotSink for BoardSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, snapshot: &FleetSnapshot) -> Result<(), ContractError> {
        self.out
            .write_all(render(snapshot).as_bytes())
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.out
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await
    }
}
