//! MonitorBlueprint - Config Loader 输出
//!
//! 描述完整的监控配置：工人名册、刷新调度、传感器来源、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

use crate::{ContractError, Roster, WorkerId};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的监控配置蓝图
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 工人名册
    #[serde(default)]
    pub fleet: FleetConfig,

    /// 刷新调度配置
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// 传感器来源配置
    #[serde(default)]
    pub source: SourceConfig,

    /// 输出路由配置
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// 默认合成工人数量
pub const DEFAULT_SYNTHETIC_WORKERS: usize = 20;

/// 工人名册配置
///
/// `workers` 与 `synthetic_workers` 二选一；都未设置时生成 20 个合成工人。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetConfig {
    /// 显式工人 ID 列表 (顺序即显示顺序)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<Vec<WorkerId>>,

    /// 生成 "Worker 1".."Worker N"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic_workers: Option<usize>,
}

impl FleetConfig {
    /// 解析出有序名册
    pub fn roster(&self) -> Result<Roster, ContractError> {
        match (&self.workers, self.synthetic_workers) {
            (Some(_), Some(_)) => Err(ContractError::config_validation(
                "fleet",
                "set either 'workers' or 'synthetic_workers', not both",
            )),
            (Some(workers), None) => Roster::new(workers.clone()),
            (None, Some(count)) => Ok(Roster::synthetic(count)),
            (None, None) => Ok(Roster::synthetic(DEFAULT_SYNTHETIC_WORKERS)),
        }
    }
}

/// 缺失读数处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReadingPolicy {
    /// 视为未佩戴 (计入分母)
    #[default]
    FailSafe,
    /// 从分母中排除
    Exclude,
}

/// 刷新调度配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulerConfig {
    /// 刷新周期 (毫秒)，必须 > 0
    #[serde(default = "default_tick_period_ms")]
    #[validate(range(min = 1, message = "tick_period_ms must be > 0"))]
    pub tick_period_ms: u64,

    /// 缺失读数策略
    #[serde(default)]
    pub missing_reading_policy: MissingReadingPolicy,

    /// 最多刷新次数 (None = 无限)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<u64>,
}

fn default_tick_period_ms() -> u64 {
    5000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            missing_reading_policy: MissingReadingPolicy::default(),
            max_ticks: None,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

/// 传感器来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// 随机模拟 (伯努利分布)
    #[default]
    Simulated,
}

/// 传感器来源配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceConfig {
    /// 来源类型
    #[serde(default)]
    pub kind: SourceKind,

    /// 佩戴头盔概率 (仅模拟来源)
    #[serde(default = "default_compliance_probability")]
    #[validate(range(
        min = 0.0,
        max = 1.0,
        message = "compliance_probability must be within [0, 1]"
    ))]
    pub compliance_probability: f64,

    /// 随机种子 (可选，便于复现)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_compliance_probability() -> f64 {
    0.7
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            compliance_probability: default_compliance_probability(),
            seed: None,
        }
    }
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    16
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// 文件输出 (JSON lines)
    File,
    /// 网络输出 (UDP)
    Network,
}
