//! 任务处理指标收集模块
//!
//! 通过 `metrics` facade 记录缓存命中、批量预加载、任务分发与文件处理指标。
//! 未安装 recorder 时所有调用均为空操作。

use metrics::{counter, histogram};

/// 记录缓存查询结果
pub fn record_cache_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("task_relay_cache_lookups_total", "outcome" => outcome).increment(1);
}

/// 记录一次批量预加载调用
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_batch_chunk;
///
/// record_batch_chunk("US", 10, true);
/// ```
pub fn record_batch_chunk(country: &str, names: usize, success: bool) {
    let status = outcome_label(success);
    counter!(
        "task_relay_batch_chunks_total",
        "country" => country.to_string(),
        "status" => status
    )
    .increment(1);
    histogram!("task_relay_batch_chunk_size").record(names as f64);
}

/// 记录任务分发结果
pub fn record_task_dispatched(task_type: &str, success: bool) {
    let status = outcome_label(success);
    counter!(
        "task_relay_tasks_dispatched_total",
        "task_type" => task_type.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录单个文件处理结果与耗时
pub fn record_file_processed(success: bool, elapsed_ms: f64) {
    let status = outcome_label(success);
    counter!("task_relay_files_processed_total", "status" => status).increment(1);
    histogram!("task_relay_file_duration_ms", "status" => status).record(elapsed_ms);
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// 耗时统计摘要
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.count {
            0 => f.write_str("N/A"),
            n => write!(
                f,
                "min={:.1} mean={:.1} max={:.1} (n={n})",
                self.min, self.mean, self.max
            ),
        }
    }
}

/// 增量统计：记录每个文件的处理耗时（毫秒）
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 记录一个样本
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            count: self.count,
            min: self.min,
            max: self.max,
            mean: self.mean().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats_tracks_extremes() {
        let mut stats = RunningStats::default();
        assert_eq!(stats.mean(), None);

        for ms in [12.0, 4.0, 20.0] {
            stats.push(ms);
        }
        let summary = stats.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 4.0);
        assert_eq!(summary.max, 20.0);
        assert_eq!(summary.mean, 12.0);
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(RunningStats::default().summary().to_string(), "N/A");

        let mut stats = RunningStats::default();
        stats.push(10.0);
        stats.push(30.0);
        assert_eq!(
            stats.summary().to_string(),
            "min=10.0 mean=20.0 max=30.0 (n=2)"
        );
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_cache_lookup(true);
        record_batch_chunk("US", 3, false);
        record_task_dispatched("age", true);
        record_file_processed(true, 12.5);
    }
}
