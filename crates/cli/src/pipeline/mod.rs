//! Monitor orchestration module.

mod board;
mod orchestrator;
mod stats;

pub use board::BoardSink;
pub use orchestrator::{Monitor, MonitorConfig};
pub use stats::MonitorStats;
