//! 舰队指标收集模块
//!
//! 基于 FleetSnapshot 收集和统计刷新调度的运行指标。

use std::collections::HashMap;

use contracts::FleetSnapshot;
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};

/// 注册指标说明 (Prometheus `# HELP`)
pub fn describe_metrics() {
    describe_counter!("helmet_watch_ticks_total", "Refresh ticks completed");
    describe_gauge!("helmet_watch_danger_rate", Unit::Percent, "Share of workers without a helmet");
    describe_histogram!("helmet_watch_danger_rate_hist", Unit::Percent, "Danger rate per tick");
    describe_gauge!("helmet_watch_fleet_size", Unit::Count, "Workers counted in the last snapshot");
    describe_gauge!("helmet_watch_workers_missing", Unit::Count, "Workers without a reading");
    describe_counter!("helmet_watch_sensor_unavailable_total", "Readings that could not be taken");
    describe_histogram!("helmet_watch_refresh_latency_ms", Unit::Milliseconds, "Poll to publish latency");
    describe_counter!("helmet_watch_ticks_collapsed_total", "Ticks merged while a refresh was running");
    describe_counter!("helmet_watch_snapshots_dropped_total", "Deliveries lost to full viewer queues");
    describe_gauge!("helmet_watch_viewers", Unit::Count, "Subscribed viewers");
}

/// 从 FleetSnapshot 记录指标
///
/// 每次刷新产生新快照时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_snapshot_metrics;
///
/// let snapshot = aggregator.aggregate(&roster, &sweep.compliance());
/// record_snapshot_metrics(&snapshot);
/// ```
pub fn record_snapshot_metrics(snapshot: &FleetSnapshot) {
    // 刷新计数器
    counter!("helmet_watch_ticks_total").increment(1);
    gauge!("helmet_watch_last_tick").set(snapshot.tick as f64);

    // 危险率
    gauge!("helmet_watch_danger_rate").set(snapshot.danger_rate);
    histogram!("helmet_watch_danger_rate_hist").record(snapshot.danger_rate);

    gauge!("helmet_watch_fleet_size").set(snapshot.fleet_size() as f64);
    gauge!("helmet_watch_workers_non_compliant").set(snapshot.non_compliant.len() as f64);

    // 缺失读数
    let missing_count = snapshot.missing.len();
    gauge!("helmet_watch_workers_missing").set(missing_count as f64);
    if missing_count > 0 {
        counter!("helmet_watch_ticks_with_missing_total").increment(1);
    }

    for worker_id in &snapshot.non_compliant {
        counter!(
            "helmet_watch_worker_non_compliant_total",
            "worker_id" => worker_id.to_string()
        )
        .increment(1);
    }
}

/// 记录传感器不可用
pub fn record_sensor_unavailable(worker_id: &str) {
    counter!(
        "helmet_watch_sensor_unavailable_total",
        "worker_id" => worker_id.to_string()
    )
    .increment(1);
}

/// 记录刷新延迟 (轮询 + 聚合 + 发布)
pub fn record_refresh_latency_ms(latency_ms: f64) {
    histogram!("helmet_watch_refresh_latency_ms").record(latency_ms);
}

/// 记录被合并的 tick
pub fn record_ticks_collapsed(count: u64) {
    if count > 0 {
        counter!("helmet_watch_ticks_collapsed_total").increment(count);
    }
}

/// 记录一次发布的结果
pub fn record_publish_outcome(delivered: usize, dropped: usize, disconnected: usize) {
    counter!("helmet_watch_snapshots_delivered_total").increment(delivered as u64);
    if dropped > 0 {
        counter!("helmet_watch_snapshots_dropped_total").increment(dropped as u64);
    }
    if disconnected > 0 {
        counter!("helmet_watch_viewers_disconnected_total").increment(disconnected as u64);
    }
}

/// 记录当前观察者数量
pub fn record_viewer_count(count: usize) {
    gauge!("helmet_watch_viewers").set(count as f64);
}

/// 舰队指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct FleetMetricsAggregator {
    /// 总刷新次数
    pub total_ticks: u64,

    /// 全员佩戴的刷新次数
    pub all_compliant_ticks: u64,

    /// 有缺失读数的刷新次数
    pub ticks_with_missing: u64,

    /// 缺失读数总数
    pub total_missing: u64,

    /// 合并的 tick 总数
    pub ticks_collapsed: u64,

    /// 被丢弃的快照投递总数
    pub dropped_deliveries: u64,

    /// 危险率统计
    pub danger_stats: RunningStats,

    /// 刷新延迟统计 (毫秒)
    pub latency_stats: RunningStats,

    /// 各工人未佩戴次数
    pub non_compliant_counts: HashMap<String, u64>,
}

impl FleetMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, snapshot: &FleetSnapshot) {
        self.total_ticks += 1;
        if snapshot.is_all_compliant() {
            self.all_compliant_ticks += 1;
        }
        if !snapshot.missing.is_empty() {
            self.ticks_with_missing += 1;
            self.total_missing += snapshot.missing.len() as u64;
        }

        self.danger_stats.push(snapshot.danger_rate);

        for worker_id in &snapshot.non_compliant {
            *self
                .non_compliant_counts
                .entry(worker_id.to_string())
                .or_insert(0) += 1;
        }
    }

    pub fn record_latency_ms(&mut self, latency_ms: f64) {
        self.latency_stats.push(latency_ms);
    }

    pub fn record_collapsed(&mut self, count: u64) {
        self.ticks_collapsed += count;
    }

    pub fn record_dropped(&mut self, count: usize) {
        self.dropped_deliveries += count as u64;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_ticks: self.total_ticks,
            all_compliant_ticks: self.all_compliant_ticks,
            ticks_with_missing: self.ticks_with_missing,
            total_missing: self.total_missing,
            ticks_collapsed: self.ticks_collapsed,
            dropped_deliveries: self.dropped_deliveries,
            missing_rate: if self.total_ticks > 0 {
                self.ticks_with_missing as f64 / self.total_ticks as f64 * 100.0
            } else {
                0.0
            },
            danger_rate: StatsSummary::from(&self.danger_stats),
            refresh_latency_ms: StatsSummary::from(&self.latency_stats),
            worker_non_compliant_counts: self.non_compliant_counts.clone(),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_ticks: u64,
    pub all_compliant_ticks: u64,
    pub ticks_with_missing: u64,
    pub total_missing: u64,
    pub ticks_collapsed: u64,
    pub dropped_deliveries: u64,
    pub missing_rate: f64,
    pub danger_rate: StatsSummary,
    pub refresh_latency_ms: StatsSummary,
    pub worker_non_compliant_counts: HashMap<String, u64>,
}

impl MetricsSummary {
    /// 未佩戴次数最多的工人 (次数降序，同次数按名称)
    pub fn top_offenders(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut counts: Vec<(&str, u64)> = self
            .worker_non_compliant_counts
            .iter()
            .map(|(id, count)| (id.as_str(), *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts.truncate(limit);
        counts
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Fleet Metrics Summary ===")?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(f, "All-compliant ticks: {}", self.all_compliant_ticks)?;
        writeln!(
            f,
            "Ticks with missing readings: {} ({:.2}%)",
            self.ticks_with_missing, self.missing_rate
        )?;
        writeln!(f, "Missing readings: {}", self.total_missing)?;
        writeln!(f, "Collapsed ticks: {}", self.ticks_collapsed)?;
        writeln!(f, "Dropped deliveries: {}", self.dropped_deliveries)?;
        writeln!(f, "Danger rate (%): {}", self.danger_rate)?;
        writeln!(f, "Refresh latency (ms): {}", self.refresh_latency_ms)?;

        let top = self.top_offenders(5);
        if !top.is_empty() {
            writeln!(f, "Most frequently non-compliant:")?;
            for (worker, count) in top {
                writeln!(f, "  {}: {}", worker, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.2}, max={:.2}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
