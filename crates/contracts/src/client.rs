//! External client abstraction
//!
//! Defines the traits the dispatcher consumes, supporting HTTP implementations
//! and mock testing behind the same interface.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AgeKey, AgeRecord, ContractError};

/// Maximum number of names the lookup service accepts in one batch call
pub const MAX_BATCH_NAMES: usize = 10;

/// Age lookup service
pub trait LookupClient: Send + Sync {
    /// Look up a single name within a country
    fn single(&self, key: &AgeKey) -> impl Future<Output = Result<AgeRecord, ContractError>> + Send;

    /// Look up up to [`MAX_BATCH_NAMES`] names sharing one country
    ///
    /// # Errors
    /// `ContractError::BatchTooLarge` when `names` exceeds the limit; no
    /// request is issued in that case.
    fn batch(
        &self,
        names: &[String],
        country: &str,
    ) -> impl Future<Output = Result<Vec<AgeRecord>, ContractError>> + Send;
}

/// Entertainment service returning one arbitrary joke record
pub trait JokeClient: Send + Sync {
    fn random(&self) -> impl Future<Output = Result<Value, ContractError>> + Send;
}

/// Echo sink acknowledging every resolved payload
pub trait EchoClient: Send + Sync {
    /// Send a record and receive it back wrapped in an envelope
    fn send(&self, record: &Value) -> impl Future<Output = Result<SinkEnvelope, ContractError>> + Send;
}

/// Reply of the echo sink
///
/// Only the `json` member (the echoed record) is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkEnvelope {
    /// The echoed payload
    pub json: Value,

    /// Endpoint that acknowledged the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SinkEnvelope {
    /// Wrap a payload, as the sink does
    pub fn new(json: Value) -> Self {
        Self { json, url: None }
    }

    /// The acknowledged payload
    pub fn into_payload(self) -> Value {
        self.json
    }
}
