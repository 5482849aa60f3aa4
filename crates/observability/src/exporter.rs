//! Prometheus 导出器

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

use crate::metrics::describe_metrics;

/// 危险率直方图分桶 (百分比)
const DANGER_RATE_BUCKETS: &[f64] = &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 75.0, 100.0];

/// 刷新耗时直方图分桶 (毫秒)
const REFRESH_LATENCY_BUCKETS: &[f64] = &[1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0];

/// 在 `0.0.0.0:port` 上暴露 `/metrics`
///
/// 需要在 Tokio 运行时内调用。全局 recorder 只能安装一次。
pub fn install_prometheus_exporter(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .set_buckets_for_metric(
            Matcher::Full("helmet_watch_danger_rate_hist".to_string()),
            DANGER_RATE_BUCKETS,
        )
        .context("Invalid danger rate buckets")?
        .set_buckets_for_metric(
            Matcher::Full("helmet_watch_refresh_latency_ms".to_string()),
            REFRESH_LATENCY_BUCKETS,
        )
        .context("Invalid refresh latency buckets")?
        .install()
        .context("Failed to install Prometheus recorder")?;

    describe_metrics();
    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}
