//! Sink implementations
//!
//! Log summary lines, JSON-lines archive files, and UDP datagrams.

mod file;
mod log;
mod network;

pub use self::file::FileSink;
pub use self::log::LogSink;
pub use self::network::{NetworkFormat, NetworkPayload, NetworkSink, NetworkSinkConfig};
