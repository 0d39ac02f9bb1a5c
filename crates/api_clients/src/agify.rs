//! Age lookup client (agify.io)

use std::time::Duration;

use contracts::{AgeKey, AgeRecord, ContractError, LookupClient, MAX_BATCH_NAMES};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http::HttpClient;

const SERVICE: &str = "agify";

/// HTTP implementation of [`LookupClient`]
#[derive(Debug, Clone)]
pub struct AgifyClient {
    http: HttpClient,
    base_url: String,
}

impl AgifyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ContractError> {
        Ok(Self {
            http: HttpClient::new(SERVICE, timeout)?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl LookupClient for AgifyClient {
    #[instrument(name = "agify_single", skip(self, key), fields(key = %key))]
    async fn single(&self, key: &AgeKey) -> Result<AgeRecord, ContractError> {
        let query = [
            ("name", key.name.as_str()),
            ("country_id", key.country.as_str()),
        ];
        self.http.get_json(&self.base_url, &query).await
    }

    #[instrument(name = "agify_batch", skip(self, names), fields(size = names.len()))]
    async fn batch(&self, names: &[String], country: &str) -> Result<Vec<AgeRecord>, ContractError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        if names.len() > MAX_BATCH_NAMES {
            return Err(ContractError::BatchTooLarge {
                size: names.len(),
                max: MAX_BATCH_NAMES,
            });
        }

        let mut query: Vec<(&str, &str)> = names.iter().map(|n| ("name[]", n.as_str())).collect();
        query.push(("country_id", country));

        match self.http.get_json(&self.base_url, &query).await? {
            Value::Array(records) => {
                debug!(returned = records.len(), "Batch lookup decoded");
                Ok(records)
            }
            other => Err(ContractError::malformed(
                SERVICE,
                format!("expected a JSON array for batch lookup, got {other}"),
            )),
        }
    }
}
