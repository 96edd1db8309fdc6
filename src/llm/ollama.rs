//! Ollama chat client for local development.
//!
//! Talks to `POST /api/chat` with `stream: false` and lifts the reply in
//! `message.content` into a `response` field, the shape the transcript
//! manager reads first.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::config::InferenceConfig;
use crate::core::errors::{ChatError, ChatResult};
use crate::llm::inference::{InferFuture, InferenceEngine};
use crate::session::message::InferenceMessage;

/// Target context length (tokens).
const CONTEXT_LENGTH: u32 = 8_192;
/// Default token budget for generation.
const DEFAULT_NUM_PREDICT: u32 = 512;
/// Keep the model loaded between turns.
const KEEP_ALIVE: &str = "5m";

#[derive(Serialize)]
struct ChatOptions {
    num_ctx: u32,
    num_predict: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [InferenceMessage],
    stream: bool,
    keep_alive: &'a str,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatReply {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

/// Ollama inference engine.
pub struct OllamaChat {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaChat {
    /// Create a client for the configured Ollama server and model.
    #[must_use]
    pub fn new(client: Client, config: &InferenceConfig) -> Self {
        let endpoint = format!(
            "{}/api/chat",
            config.effective_base_url().trim_end_matches('/')
        );
        Self {
            client,
            endpoint,
            model: config.effective_model().to_string(),
        }
    }

    async fn post_chat(&self, messages: &[InferenceMessage]) -> ChatResult<Value> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            keep_alive: KEEP_ALIVE,
            options: ChatOptions {
                num_ctx: CONTEXT_LENGTH,
                num_predict: DEFAULT_NUM_PREDICT,
            },
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::InferenceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.json::<Value>().await?;
        let content = ChatReply::deserialize(&raw)
            .ok()
            .and_then(|reply| reply.message)
            .map(|message| message.content)
            .filter(|content| !content.is_empty());
        match content {
            Some(content) => Ok(json!({ "response": content })),
            None => Ok(raw),
        }
    }
}

impl InferenceEngine for OllamaChat {
    fn run<'a>(&'a self, messages: &'a [InferenceMessage]) -> InferFuture<'a, ChatResult<Value>> {
        Box::pin(self.post_chat(messages))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::core::config::{InferenceBackend, OLLAMA_MODEL};
    use crate::session::message::Role;

    fn engine(base_url: &str) -> OllamaChat {
        let config = InferenceConfig {
            backend: InferenceBackend::Ollama,
            base_url: Some(base_url.to_string()),
            ..InferenceConfig::default()
        };
        OllamaChat::new(Client::new(), &config)
    }

    fn messages() -> Vec<InferenceMessage> {
        vec![
            InferenceMessage {
                role: Role::System,
                content: "be brief".to_string(),
            },
            InferenceMessage {
                role: Role::User,
                content: "hi".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_lifts_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": OLLAMA_MODEL,
                "stream": false,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": OLLAMA_MODEL,
                "message": {"role": "assistant", "content": "hello"},
                "done": true
            })))
            .mount(&server)
            .await;

        let result = engine(&server.uri()).run(&messages()).await;
        assert_eq!(result.ok(), Some(json!({"response": "hello"})));
    }

    #[tokio::test]
    async fn test_passes_through_unexpected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
            .mount(&server)
            .await;

        let result = engine(&server.uri()).run(&messages()).await;
        assert_eq!(result.ok(), Some(json!({"done": true})));
    }

    #[tokio::test]
    async fn test_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let result = engine(&server.uri()).run(&messages()).await;
        assert!(matches!(
            result,
            Err(ChatError::InferenceStatus { status: 404, ref body }) if body == "model not found"
        ));
    }
}
