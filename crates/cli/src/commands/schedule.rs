//! `schedule` command implementation.
//!
//! 每天在本地时间 `process_time` 执行一次处理，直到收到 Ctrl+C / SIGTERM。
//! 单次运行失败只记录日志，调度继续。

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use contracts::{is_valid_process_time, Settings};
use tracing::{error, info, warn};

use crate::cli::ScheduleArgs;
use crate::commands::signal::shutdown_signal;
use crate::error::CliError;
use crate::pipeline::run_once;

/// Parse a strict `HH:MM` time
pub fn parse_process_time(value: &str) -> Result<NaiveTime, CliError> {
    if !is_valid_process_time(value) {
        return Err(CliError::invalid_process_time(value));
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| CliError::invalid_process_time(value))
}

/// Next run strictly after `now` at wall-clock time `at`
pub fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Execute the `schedule` command
pub async fn run_schedule(args: &ScheduleArgs, settings: &Settings) -> Result<()> {
    let process_time = args
        .at
        .as_deref()
        .unwrap_or(settings.schedule.process_time.as_str());
    let at = parse_process_time(process_time)?;

    info!(process_time, "Scheduler started, waiting for scheduled time");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let now = Local::now().naive_local();
        let next = next_run(now, at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        info!(next_run = %next, wait_secs = wait.as_secs(), "Next run scheduled");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping scheduler");
                break;
            }
        }

        info!("Starting daily processing");
        tokio::select! {
            result = run_once(settings) => match result {
                Ok(stats) => {
                    info!(
                        succeeded = stats.report.succeeded,
                        failed = stats.report.failed,
                        invalid = stats.report.invalid,
                        "Daily processing finished"
                    );
                    stats.print_summary();
                }
                Err(e) => error!(error = %e, "Daily processing failed, waiting for next run"),
            },
            _ = &mut shutdown => {
                warn!("Received shutdown signal during a run, stopping scheduler");
                break;
            }
        }
    }

    info!("Scheduler stopped");
    Ok(())
}
