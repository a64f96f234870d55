//! OpenAI Chat Completions API driver.
//!
//! This module implements [`CompletionModel`] for the OpenAI Chat Completions
//! API (`/v1/chat/completions`) and the many providers that mimic it. The
//! request is sent with `stream: false` and the whole reply is read at once.

use anyhow::Context;
use serde::Deserialize;

use super::{CompletionModel, LlmSettings};

/// Driver for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait::async_trait]
impl CompletionModel for ChatCompletionsDriver {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url = self.settings.provider.build_chat_url(&self.settings.base_url);

        let body = serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp: ChatResponse = rb
            .send()
            .await
            .context("chat completions request failed")?
            .error_for_status()?
            .json()
            .await
            .context("chat completions reply was not valid JSON")?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("chat completions reply contained no message content"))
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmProtocol, Provider};
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn settings(base_url: String, api_key: Option<&str>) -> LlmSettings {
        LlmSettings {
            provider: Provider::detect_from_url(&base_url),
            base_url,
            api_key: api_key.map(ToString::to_string),
            model: "stub-model".to_string(),
            protocol: LlmProtocol::Chat,
        }
    }

    /// Echoes the auth header, model and prompt back as the completion.
    async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none")
            .to_string();
        let content = format!(
            "{auth}|{}|{}|{}",
            body["model"].as_str().unwrap_or_default(),
            body["stream"],
            body["messages"][0]["content"].as_str().unwrap_or_default()
        );
        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
    }

    #[tokio::test]
    async fn test_complete_sends_prompt_and_key() {
        let base = spawn_stub(Router::new().route("/v1/chat/completions", post(echo))).await;
        let driver = ChatCompletionsDriver::new(settings(base, Some("sk-test")));

        let reply = driver.complete("make cards").await.unwrap();
        assert_eq!(reply, "Bearer sk-test|stub-model|false|make cards");
    }

    #[tokio::test]
    async fn test_complete_without_key_sends_no_auth() {
        let base = spawn_stub(Router::new().route("/v1/chat/completions", post(echo))).await;
        let driver = ChatCompletionsDriver::new(settings(base, None));

        let reply = driver.complete("x").await.unwrap();
        assert!(reply.starts_with("none|"));
    }

    #[tokio::test]
    async fn test_error_status_is_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn_stub(router).await;
        let driver = ChatCompletionsDriver::new(settings(base, Some("wrong")));

        let err = driver.complete("x").await.unwrap_err();
        assert!(err.to_string().contains("401"), "got: {err}");
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base = spawn_stub(router).await;
        let driver = ChatCompletionsDriver::new(settings(base, None));

        assert!(driver.complete("x").await.is_err());
    }
}
