//! Echo sink client (postman-echo)

use std::time::Duration;

use contracts::{ContractError, EchoClient, SinkEnvelope};
use serde_json::Value;
use tracing::instrument;

use crate::http::HttpClient;

const SERVICE: &str = "echo";

/// HTTP implementation of [`EchoClient`]
#[derive(Debug, Clone)]
pub struct PostmanEchoClient {
    http: HttpClient,
    url: String,
}

impl PostmanEchoClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ContractError> {
        Ok(Self {
            http: HttpClient::new(SERVICE, timeout)?,
            url: url.into(),
        })
    }
}

impl EchoClient for PostmanEchoClient {
    #[instrument(name = "echo_send", skip(self, record))]
    async fn send(&self, record: &Value) -> Result<SinkEnvelope, ContractError> {
        let reply = self.http.post_json(&self.url, record).await?;
        serde_json::from_value(reply)
            .map_err(|e| ContractError::malformed(SERVICE, format!("invalid envelope: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_returns_envelope() {
        let server = MockServer::start().await;
        let record = json!({"type": "note", "text": "hi"});
        Mock::given(method("POST"))
            .and(body_json(record.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "args": {},
                "json": record.clone(),
                "url": "https://postman-echo.com/post"
            })))
            .mount(&server)
            .await;

        let client = PostmanEchoClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        let envelope = client.send(&record).await.unwrap();
        assert_eq!(envelope.json, record);
    }

    #[tokio::test]
    async fn test_missing_json_member_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "x"})))
            .mount(&server)
            .await;

        let client = PostmanEchoClient::new(server.uri(), Duration::from_secs(2)).unwrap();
        let err = client.send(&json!({})).await.unwrap_err();
        assert!(matches!(err, ContractError::MalformedResponse { .. }));
    }
}
