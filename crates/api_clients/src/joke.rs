//! Random joke client

use std::time::Duration;

use contracts::{ContractError, JokeClient};
use serde_json::Value;
use tracing::instrument;

use crate::http::HttpClient;

/// HTTP implementation of [`JokeClient`]
#[derive(Debug, Clone)]
pub struct JokeApiClient {
    http: HttpClient,
    url: String,
}

impl JokeApiClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ContractError> {
        Ok(Self {
            http: HttpClient::new("joke", timeout)?,
            url: url.into(),
        })
    }
}

impl JokeClient for JokeApiClient {
    #[instrument(name = "joke_random", skip(self))]
    async fn random(&self) -> Result<Value, ContractError> {
        self.http.get_json(&self.url, &[] as &[(&str, &str)]).await
    }
}
