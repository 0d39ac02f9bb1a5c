//! # Task Relay CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与环境变量覆盖
//! - 单次运行与每日定时运行
//! - 配置与输入文件校验
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod pipeline;
mod settings;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_command, run_schedule, run_validate};
use settings::{load_settings, observability_config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // `validate` reports bad settings itself, so it logs to the console only
    let settings = match &cli.command {
        Commands::Validate(_) => None,
        command => Some(load_settings(command.settings())?),
    };

    // Guards must live until exit so buffered log lines are flushed
    let _guards = observability::init_with_config(observability_config(&cli, settings.as_ref()))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Task Relay CLI starting"
    );

    // Execute command
    let result = match (&cli.command, &settings) {
        (Commands::Run(args), Some(settings)) => run_command(args, settings).await,
        (Commands::Schedule(args), Some(settings)) => run_schedule(args, settings).await,
        (Commands::Validate(args), _) => run_validate(args).await,
        (_, None) => Err(anyhow::anyhow!("Settings were not loaded")),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
