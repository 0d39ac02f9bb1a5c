//! Settings - Config Loader output
//!
//! Describes a complete processing setup: input tree, schedule, logging,
//! remote endpoints and HTTP behavior. Every section is optional.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::MAX_BATCH_NAMES;

/// Complete runtime settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Input tree
    #[serde(default)]
    #[validate(nested)]
    pub input: InputConfig,

    /// Daily schedule
    #[serde(default)]
    #[validate(nested)]
    pub schedule: ScheduleConfig,

    /// Logging output
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,

    /// Remote service endpoints
    #[serde(default)]
    #[validate(nested)]
    pub endpoints: EndpointsConfig,

    /// Outbound HTTP behavior
    #[serde(default)]
    #[validate(nested)]
    pub http: HttpConfig,

    /// Batch preload tuning
    #[serde(default)]
    #[validate(nested)]
    pub preload: PreloadConfig,
}

/// Input tree settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InputConfig {
    /// Root directory scanned recursively for `*.json` task files
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,

    /// Appended to the input file stem to name its output
    #[serde(default = "default_processed_suffix")]
    #[validate(length(min = 1, message = "processed_suffix cannot be empty"))]
    pub processed_suffix: String,

    /// Upper bound on files dispatched at the same time
    #[serde(default = "default_max_concurrent_files")]
    #[validate(range(min = 1, message = "max_concurrent_files must be >= 1"))]
    pub max_concurrent_files: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            processed_suffix: default_processed_suffix(),
            max_concurrent_files: default_max_concurrent_files(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("INPUT")
}

fn default_processed_suffix() -> String {
    "_processed".to_string()
}

fn default_max_concurrent_files() -> usize {
    32
}

/// Daily schedule settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleConfig {
    /// Local wall-clock time of the daily run, `HH:MM`
    #[serde(default = "default_process_time")]
    #[validate(custom(function = "validate_process_time"))]
    pub process_time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            process_time: default_process_time(),
        }
    }
}

fn default_process_time() -> String {
    "18:10".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Directory holding `info.log` and `error.log`
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Mirror log output to the console
    #[serde(default)]
    pub to_console: bool,

    /// Console format
    #[serde(default)]
    pub format: LogFormat,

    /// Default level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    #[validate(length(min = 1, message = "level cannot be empty"))]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            to_console: false,
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Remote endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EndpointsConfig {
    /// Age lookup service
    #[serde(default = "default_lookup_url")]
    #[validate(url)]
    pub lookup_url: String,

    /// Random joke service
    #[serde(default = "default_joke_url")]
    #[validate(url)]
    pub joke_url: String,

    /// Echo sink
    #[serde(default = "default_echo_url")]
    #[validate(url)]
    pub echo_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            lookup_url: default_lookup_url(),
            joke_url: default_joke_url(),
            echo_url: default_echo_url(),
        }
    }
}

fn default_lookup_url() -> String {
    "https://api.agify.io".to_string()
}

fn default_joke_url() -> String {
    "https://official-joke-api.appspot.com/random_joke".to_string()
}

fn default_echo_url() -> String {
    "https://postman-echo.com/post".to_string()
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HttpConfig {
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1, message = "timeout_secs must be >= 1"))]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

/// Batch preload settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreloadConfig {
    /// Names per batch call
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1, max = 10, message = "batch_size must be within 1..=10"))]
    pub batch_size: usize,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    MAX_BATCH_NAMES
}

/// Check a strict 24h `HH:MM` time, leading zeros required
pub fn is_valid_process_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    if ![0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit()) {
        return false;
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hour < 24 && minute < 60
}

fn validate_process_time(value: &str) -> Result<(), ValidationError> {
    if is_valid_process_time(value) {
        Ok(())
    } else {
        Err(ValidationError::new("process_time")
            .with_message(format!("invalid process_time '{value}', expected HH:MM").into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.preload.batch_size, 10);
        assert_eq!(settings.http.timeout_secs, 5);
        assert_eq!(settings.input.processed_suffix, "_processed");
    }

    #[test]
    fn test_process_time_format() {
        for ok in ["00:00", "09:30", "18:10", "23:59"] {
            assert!(is_valid_process_time(ok), "{ok} should be valid");
        }
        for bad in ["9:30", "24:00", "12:60", "1210", "12:5a", "", "12:300"] {
            assert!(!is_valid_process_time(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_batch_size_above_limit_is_invalid() {
        let mut settings = Settings::default();
        settings.preload.batch_size = 11;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bad_url_is_invalid() {
        let mut settings = Settings::default();
        settings.endpoints.echo_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }
}
