//! # Scheduler
//!
//! 周期刷新调度模块。
//!
//! 核心职责：
//! - 按固定周期轮询传感器来源 (首个 tick 立即触发)
//! - 聚合为 `FleetSnapshot` 并原子替换当前快照
//! - 通过 `SnapshotPublisher` 发布给所有观察者
//! - 刷新期间错过的 tick 合并为至多一个待执行 tick
//! - 协作式停止：不中断进行中的刷新
//!
//! ## 状态机
//!
//! ```text
//! Idle --tick--> Refreshing --snapshot published--> Idle
//! ```

mod error;
mod handle;
mod scheduler;
mod stats;

pub use error::SchedulerError;
pub use handle::{SchedulerHandle, SchedulerState, SnapshotReader};
pub use scheduler::RefreshScheduler;
pub use stats::SchedulerStats;
