//! Dispatcher error types

use contracts::{AgeKey, ContractError};
use thiserror::Error;

/// Dispatcher-specific errors
///
/// Each variant carries the task context the failure happened in.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Single-key age lookup failed
    #[error("age lookup failed for {key}: {source}")]
    Lookup {
        key: AgeKey,
        #[source]
        source: ContractError,
    },

    /// Joke retrieval failed
    #[error("joke retrieval failed: {source}")]
    Joke {
        #[source]
        source: ContractError,
    },

    /// Echo sink rejected or failed to acknowledge the payload
    #[error("sink failed for '{task_type}' task: {source}")]
    Sink {
        task_type: String,
        #[source]
        source: ContractError,
    },
}
