//! CLI argument definitions using clap.

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Task Relay - batch processor for JSON task files
#[derive(Parser, Debug)]
#[command(
    name = "task-relay",
    author,
    version,
    about = "Process JSON task files through remote services",
    long_about = "Scans an input tree for JSON task files, resolves each task through \n\
                  the age lookup, joke or passthrough path, acknowledges the result \n\
                  through the echo sink and writes <stem>_processed.json next to the input."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TASK_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Console log format (defaults to the configured one)
    #[arg(long, value_enum, global = true, env = "TASK_RELAY_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process the input tree once
    Run(RunArgs),

    /// Process the input tree every day at the configured time
    Schedule(ScheduleArgs),

    /// Validate settings and input files without processing
    Validate(ValidateArgs),
}

impl Commands {
    /// Settings options shared by every command
    pub fn settings(&self) -> &SettingsArgs {
        match self {
            Self::Run(args) => &args.settings,
            Self::Schedule(args) => &args.settings,
            Self::Validate(args) => &args.settings,
        }
    }
}

/// Settings file and per-field overrides
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Path to settings file (TOML or JSON); defaults apply when absent
    #[arg(
        short,
        long,
        default_value = "task-relay.toml",
        env = "TASK_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the input directory
    #[arg(short, long, env = "INPUT_DIR")]
    pub input: Option<PathBuf>,

    /// Override the log directory
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Mirror logs to the console
    #[arg(long, env = "LOG_TO_CONSOLE", value_parser = BoolishValueParser::new())]
    pub log_to_console: Option<bool>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TASK_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Scan and validate inputs, show the preload plan, make no network calls
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `schedule` command
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Daily run time, HH:MM (overrides schedule.process_time)
    #[arg(long, env = "PROCESS_TIME")]
    pub at: Option<String>,
}

/// Arguments for the `validate` command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for contracts::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_schedule_with_overrides() {
        let cli = Cli::try_parse_from([
            "task-relay",
            "-v",
            "schedule",
            "--at",
            "06:30",
            "--input",
            "data",
            "--log-to-console",
            "yes",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Schedule(args) => {
                assert_eq!(args.at.as_deref(), Some("06:30"));
                assert_eq!(args.settings.input, Some(PathBuf::from("data")));
                assert_eq!(args.settings.log_to_console, Some(true));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["task-relay", "-q", "-v", "run"]).is_err());
    }
}
