//! Settings assembly: file, environment and CLI overrides.

use config_loader::ConfigLoader;
use contracts::Settings;
use observability::ObservabilityConfig;

use crate::cli::{Cli, SettingsArgs};
use crate::error::{CliError, Result};

/// Load the settings file (defaults when absent) and apply overrides
pub fn load_settings(args: &SettingsArgs) -> Result<Settings> {
    let path = args.config.display().to_string();
    let mut settings = ConfigLoader::load_or_default(Some(args.config.as_path()))
        .map_err(|e| CliError::settings(&path, e))?;

    if let Some(input) = &args.input {
        settings.input.dir = input.clone();
    }
    if let Some(log_dir) = &args.log_dir {
        settings.logging.dir = log_dir.clone();
    }
    if let Some(to_console) = args.log_to_console {
        settings.logging.to_console = to_console;
    }

    ConfigLoader::validated(settings).map_err(|e| CliError::settings(path, e))
}

/// Logging setup for a command
///
/// Without usable settings only the console is used.
pub fn observability_config(cli: &Cli, settings: Option<&Settings>) -> ObservabilityConfig {
    let mut config = match settings {
        Some(settings) => ObservabilityConfig::from_logging(&settings.logging),
        None => ObservabilityConfig::default(),
    };

    if let Some(format) = cli.log_format {
        config.log_format = format.into();
    }
    if cli.quiet {
        config.default_log_level = "warn".to_string();
    } else if cli.verbose > 0 {
        config.default_log_level = if cli.verbose == 1 { "debug" } else { "trace" }.to_string();
    }

    let port = cli.command.settings().metrics_port;
    config.metrics_port = (port != 0).then_some(port);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[input]\ndir = \"from-file\"\n[logging]\ndir = \"file-logs\"").unwrap();

        let cli = Cli::try_parse_from([
            "task-relay",
            "run",
            "--config",
            file.path().to_str().unwrap(),
            "--input",
            "from-cli",
        ])
        .unwrap();

        let settings = load_settings(cli.command.settings()).unwrap();
        assert_eq!(settings.input.dir, Path::new("from-cli"));
        assert_eq!(settings.logging.dir, Path::new("file-logs"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cli = Cli::try_parse_from([
            "task-relay",
            "run",
            "--config",
            "/nonexistent/task-relay.toml",
        ])
        .unwrap();

        let settings = load_settings(cli.command.settings()).unwrap();
        assert_eq!(settings.schedule.process_time, "18:10");
    }

    #[test]
    fn test_verbosity_maps_to_level() {
        let cli = Cli::try_parse_from(["task-relay", "-vv", "--log-format", "json", "run"]).unwrap();
        let config = observability_config(&cli, Some(&Settings::default()));
        assert_eq!(config.default_log_level, "trace");
        assert_eq!(config.log_format, contracts::LogFormat::Json);
        assert_eq!(config.metrics_port, None);
    }
}
