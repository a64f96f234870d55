//! Google Gemini `generateContent` driver.

use anyhow::Context;
use serde::Deserialize;

use super::{CompletionModel, LlmSettings, Provider};

/// Driver for Gemini's native REST API.
///
/// The API key travels in the `x-goog-api-key` header rather than the query
/// string so it never shows up in request traces.
#[derive(Clone)]
pub struct GeminiDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for GeminiDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl GeminiDriver {
    /// Create a new Gemini driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

#[async_trait::async_trait]
impl CompletionModel for GeminiDriver {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url =
            Provider::build_generate_content_url(&self.settings.base_url, &self.settings.model);

        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.header("x-goog-api-key", k);
        }

        let resp: GenerateContentResponse = rb
            .send()
            .await
            .context("gemini request failed")?
            .error_for_status()?
            .json()
            .await
            .context("gemini reply was not valid JSON")?;

        // A blocked prompt comes back as 200 with no candidates
        resp.into_text()
            .ok_or_else(|| anyhow::anyhow!("gemini returned no candidates"))
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
