//! Layered error definitions
//!
//! Categorized by source: config / task / remote services / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Task Errors =====
    /// Task record failed input validation
    #[error("invalid task: {message}")]
    InvalidTask { message: String },

    // ===== Remote Service Errors =====
    /// Connection failure or timeout
    #[error("{service} network error: {message}")]
    Network { service: String, message: String },

    /// Non-success HTTP status
    #[error("{service} returned status {status}: {message}")]
    Remote {
        service: String,
        status: u16,
        message: String,
    },

    /// Response body could not be decoded or lacks expected fields
    #[error("{service} returned a malformed response: {message}")]
    MalformedResponse { service: String, message: String },

    /// Batch lookup called with too many names
    #[error("batch of {size} names exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create task validation error
    pub fn invalid_task(message: impl Into<String>) -> Self {
        Self::InvalidTask {
            message: message.into(),
        }
    }

    /// Create network error
    pub fn network(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create remote status error
    pub fn remote(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Create malformed response error
    pub fn malformed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from talking to a remote service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Remote { .. } | Self::MalformedResponse { .. }
        )
    }
}
