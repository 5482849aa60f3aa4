//! # Publisher
//!
//! 快照分发模块。
//!
//! 负责：
//! - 管理观察者订阅 (subscribe / unsubscribe)
//! - 将 `FleetSnapshot` fan-out 到所有观察者
//! - 隔离慢观察者与失败的观察者，不阻塞刷新主链路
//! - 内置 sink (log / file / network) 作为观察者运行

pub mod error;
pub mod handle;
pub mod metrics;
pub mod publisher;
pub mod sinks;

pub use contracts::{FleetSnapshot, SnapshotSink};
pub use error::PublisherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, ViewerMetrics};
pub use publisher::{
    create_sink_handle, spawn_sinks, PublishReport, SnapshotPublisher, Subscription, ViewerId,
};
pub use sinks::{FileSink, LogSink, NetworkSink};
