//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (控制台 JSON/Pretty/Compact 格式 + info.log / error.log 文件)
//! - Prometheus 指标导出
//! - 任务分发、批量预加载、文件处理指标
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{init_with_config, ObservabilityConfig};
//!
//! // 初始化，guard 需在进程生命周期内持有
//! let _guards = init_with_config(ObservabilityConfig::default())?;
//!
//! // 记录分发指标
//! observability::record_task_dispatched("age", true);
//! ```

pub mod metrics;

use std::path::PathBuf;

use anyhow::{Context, Result};
use contracts::{LogFormat, LoggingConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

// Re-exports
pub use crate::metrics::{
    record_batch_chunk, record_cache_lookup, record_file_processed, record_task_dispatched,
    RunningStats, StatsSummary,
};

/// 信息日志文件名 (INFO 及以上)
pub const INFO_LOG_FILE: &str = "info.log";
/// 错误日志文件名 (仅 ERROR)
pub const ERROR_LOG_FILE: &str = "error.log";

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// 控制台日志格式
    pub log_format: LogFormat,
    /// 是否输出到控制台
    pub console: bool,
    /// 日志文件目录 (None = 不写文件)
    pub log_dir: Option<PathBuf>,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
    /// 默认日志级别
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            console: true,
            log_dir: None,
            metrics_port: None,
            default_log_level: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 从 logging 配置段构建
    pub fn from_logging(logging: &LoggingConfig) -> Self {
        Self {
            log_format: logging.format,
            console: logging.to_console,
            log_dir: Some(logging.dir.clone()),
            metrics_port: None,
            default_log_level: logging.level.clone(),
        }
    }

    /// 是否有控制台输出；没有任何输出目标时强制启用控制台
    fn console_enabled(&self) -> bool {
        self.console || self.log_dir.is_none()
    }
}

/// 日志写入线程的 guard
///
/// Drop 时刷新缓冲的日志，必须在 main 中持有。
#[must_use = "dropping the guards stops file logging"]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// 使用自定义配置初始化
pub fn init_with_config(config: ObservabilityConfig) -> Result<LogGuards> {
    // 1. Initialize Tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let mut guards = Vec::new();

    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let (info_writer, info_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, INFO_LOG_FILE));
        let (error_writer, error_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, ERROR_LOG_FILE));
        guards.push(info_guard);
        guards.push(error_guard);

        layers.push(
            fmt::layer()
                .with_writer(info_writer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(LevelFilter::INFO)
                .boxed(),
        );
        layers.push(
            fmt::layer()
                .with_writer(error_writer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(LevelFilter::ERROR)
                .boxed(),
        );
    }

    if config.console_enabled() {
        layers.push(console_layer(config.log_format));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    // 2. Initialize Prometheus Exporter (if enabled)
    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        log_dir = ?config.log_dir,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(LogGuards { _guards: guards })
}

/// 仅初始化 Prometheus 指标（不初始化 Tracing）
pub fn init_metrics_only(port: u16) -> Result<()> {
    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}

fn console_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    }
}
