//! Cloudflare Workers AI REST client.
//!
//! `POST {base}/accounts/{account}/ai/run/{model}` with a bearer token. The
//! API wraps model output in `{ result, success, errors, messages }`; only
//! `result` is handed back to the caller.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config::InferenceConfig;
use crate::core::errors::{ChatError, ChatResult};
use crate::llm::inference::{InferFuture, InferenceEngine};
use crate::session::message::InferenceMessage;

#[derive(Serialize)]
struct RunRequest<'a> {
    messages: &'a [InferenceMessage],
}

#[derive(Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

const fn default_success() -> bool {
    true
}

/// Workers AI inference engine.
pub struct WorkersAi {
    client: Client,
    endpoint: String,
    api_token: String,
    model: String,
}

impl WorkersAi {
    /// Create a client for the configured account and model.
    ///
    /// # Errors
    /// Returns an error if the account id or API token is missing.
    pub fn new(client: Client, config: &InferenceConfig) -> ChatResult<Self> {
        let account_id = config
            .account_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ChatError::InvalidConfig("workers_ai needs an account id".to_string()))?;
        let api_token = config
            .api_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ChatError::InvalidConfig("workers_ai needs an API token".to_string()))?;
        let model = config.effective_model().to_string();
        let endpoint = format!(
            "{}/accounts/{account_id}/ai/run/{model}",
            config.effective_base_url().trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            api_token,
            model,
        })
    }

    async fn post_run(&self, messages: &[InferenceMessage]) -> ChatResult<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&RunRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::InferenceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = response.json::<RunEnvelope>().await?;
        if !envelope.success {
            let reasons = envelope
                .errors
                .iter()
                .map(|err| match err.code {
                    Some(code) => format!("{code}: {}", err.message),
                    None => err.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ChatError::InferenceRejected(reasons));
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

impl InferenceEngine for WorkersAi {
    fn run<'a>(&'a self, messages: &'a [InferenceMessage]) -> InferFuture<'a, ChatResult<Value>> {
        Box::pin(self.post_run(messages))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::core::config::{InferenceBackend, WORKERS_AI_MODEL};
    use crate::session::message::Role;

    fn config(base_url: &str) -> InferenceConfig {
        InferenceConfig {
            backend: InferenceBackend::WorkersAi,
            base_url: Some(base_url.to_string()),
            account_id: Some("acct".to_string()),
            api_token: Some("secret".to_string()),
            ..InferenceConfig::default()
        }
    }

    fn messages() -> Vec<InferenceMessage> {
        vec![InferenceMessage {
            role: Role::User,
            content: "ping".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_unwraps_result_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/accounts/acct/ai/run/{WORKERS_AI_MODEL}")))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({"messages": [{"role": "user", "content": "ping"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"response": "pong"},
                "success": true,
                "errors": [],
                "messages": []
            })))
            .mount(&server)
            .await;

        let engine = WorkersAi::new(Client::new(), &config(&server.uri()));
        assert!(engine.is_ok());
        let Ok(engine) = engine else { return };
        let result = engine.run(&messages()).await;
        assert_eq!(result.ok(), Some(json!({"response": "pong"})));
    }

    #[tokio::test]
    async fn test_reports_api_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": null,
                "success": false,
                "errors": [{"code": 5007, "message": "No such model"}]
            })))
            .mount(&server)
            .await;

        let engine = WorkersAi::new(Client::new(), &config(&server.uri()));
        assert!(engine.is_ok());
        let Ok(engine) = engine else { return };
        let result = engine.run(&messages()).await;
        assert!(
            matches!(result, Err(ChatError::InferenceRejected(ref reason)) if reason == "5007: No such model")
        );
    }

    #[tokio::test]
    async fn test_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let engine = WorkersAi::new(Client::new(), &config(&server.uri()));
        assert!(engine.is_ok());
        let Ok(engine) = engine else { return };
        let result = engine.run(&messages()).await;
        assert!(matches!(
            result,
            Err(ChatError::InferenceStatus { status: 401, .. })
        ));
    }

    #[test]
    fn test_requires_credentials() {
        let mut config = config("http://localhost");
        config.api_token = None;
        assert!(matches!(
            WorkersAi::new(Client::new(), &config),
            Err(ChatError::InvalidConfig(_))
        ));
    }
}
