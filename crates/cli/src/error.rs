//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Settings could not be loaded or failed validation
    #[error("Failed to load settings from {path}: {source}")]
    Settings {
        path: String,
        #[source]
        source: contracts::ContractError,
    },

    /// Remote client construction failed
    #[error("Failed to build {service} client: {source}")]
    ClientSetup {
        service: &'static str,
        #[source]
        source: contracts::ContractError,
    },

    /// Schedule time is not HH:MM
    #[error("Invalid process time '{value}', expected HH:MM")]
    InvalidProcessTime { value: String },

    /// A processing run could not start
    #[error("Processing run failed: {0}")]
    Processing(#[from] ingestion::IngestionError),
}

impl CliError {
    pub fn settings(path: impl Into<String>, source: contracts::ContractError) -> Self {
        Self::Settings {
            path: path.into(),
            source,
        }
    }

    pub fn client_setup(service: &'static str, source: contracts::ContractError) -> Self {
        Self::ClientSetup { service, source }
    }

    pub fn invalid_process_time(value: impl Into<String>) -> Self {
        Self::InvalidProcessTime {
            value: value.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
