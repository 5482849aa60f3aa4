//! # Aggregator
//!
//! 工人合规聚合（纯函数）。
//!
//! 负责：
//! - 以名册为准确定成员与顺序
//! - 按缺失读数策略处理无读数的工人
//! - 计算未佩戴列表与危险率
//! - 输出 `FleetSnapshot`
//!
//! ## 使用示例
//!
//! ```ignore
//! use aggregator::{FleetAggregator, MissingReadingPolicy};
//!
//! let aggregator = FleetAggregator::new(MissingReadingPolicy::FailSafe);
//! let snapshot = aggregator.aggregate(&roster, &sweep.compliance());
//! println!("{}", snapshot.danger_rate_label());
//! ```

mod aggregator;

pub use aggregator::{danger_rate, FleetAggregator};

// Re-export contracts types
pub use contracts::{FleetSnapshot, MissingReadingPolicy, WorkerId, WorkerStatus};
