//! Shared HTTP plumbing
//!
//! Wraps a `reqwest::Client` with a per-call timeout and maps transport,
//! status and decode failures onto [`ContractError`].

use std::time::Duration;

use contracts::ContractError;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// HTTP client bound to one remote service
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    service: &'static str,
}

impl HttpClient {
    /// Build a client whose every call is bounded by `timeout`
    pub fn new(service: &'static str, timeout: Duration) -> Result<Self, ContractError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("task-relay/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContractError::network(service, format!("failed to build client: {e}")))?;

        Ok(Self { client, service })
    }

    /// GET `url` with the given query pairs and decode the JSON body
    pub async fn get_json<Q>(&self, url: &str, query: &Q) -> Result<Value, ContractError>
    where
        Q: Serialize + ?Sized,
    {
        debug!(service = self.service, url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.decode(response).await
    }

    /// POST `body` as JSON to `url` and decode the JSON reply
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ContractError> {
        debug!(service = self.service, url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.decode(response).await
    }

    async fn decode(&self, response: Response) -> Result<Value, ContractError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                body
            };
            return Err(ContractError::remote(self.service, status.as_u16(), message));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                ContractError::malformed(self.service, format!("failed to parse response: {e}"))
            }
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> ContractError {
        if error.is_timeout() {
            ContractError::network(self.service, format!("request timed out: {error}"))
        } else {
            ContractError::network(self.service, error.to_string())
        }
    }
}
