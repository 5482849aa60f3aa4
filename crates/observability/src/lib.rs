//! # Observability
//!
//! 可观测性模块：Tracing 日志 + Prometheus 指标。
//!
//! - [`logging`]: subscriber 安装 (JSON / Pretty / Compact)
//! - [`exporter`]: Prometheus HTTP 端点
//! - [`metrics`]: 每次刷新的指标记录与运行摘要
//!
//! ```ignore
//! observability::init_with_config(ObservabilityConfig {
//!     log_format: LogFormat::Compact,
//!     metrics_port: None,
//!     default_log_level: "debug".into(),
//! })?;
//!
//! let snapshot = aggregator.aggregate(&roster, &sweep.compliance());
//! observability::record_snapshot_metrics(&snapshot);
//! ```

pub mod exporter;
pub mod logging;
pub mod metrics;

use anyhow::Result;

pub use crate::exporter::install_prometheus_exporter;
pub use crate::logging::{init_tracing, LogFormat};
pub use crate::metrics::{
    describe_metrics, record_publish_outcome, record_refresh_latency_ms,
    record_sensor_unavailable, record_snapshot_metrics, record_ticks_collapsed,
    record_viewer_count, FleetMetricsAggregator, MetricsSummary,
    RunningStats, StatsSummary,
};

/// 默认 Prometheus 端口
pub const DEFAULT_METRICS_PORT: u16 = 9000;

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus 端口 (None 或 0 = 禁用)
    pub metrics_port: Option<u16>,
    /// 未设置 `RUST_LOG` 时的日志级别
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: Some(DEFAULT_METRICS_PORT),
            default_log_level: "info".to_string(),
        }
    }
}

/// 安装 subscriber，端口非零时再安装 Prometheus 导出器
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    init_tracing(config.log_format, &config.default_log_level)?;

    if let Some(port) = config.metrics_port.filter(|p| *p != 0) {
        install_prometheus_exporter(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, Some(DEFAULT_METRICS_PORT));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.default_log_level, "info");
    }
}
