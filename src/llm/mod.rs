//! Generative model drivers.
//!
//! Flashcard generation needs exactly one thing from a model: send a prompt,
//! get text back. The [`CompletionModel`] trait captures that, and the
//! drivers below implement it for the protocols we talk to.
//!
//! # Drivers
//!
//! - [`GeminiDriver`]: Google Gemini `generateContent` API
//! - [`ChatCompletionsDriver`]: `OpenAI` Chat Completions API (`/v1/chat/completions`)
//!
//! Calls are single-shot: no streaming, no tools, no retries and no request
//! timeout beyond whatever the transport imposes.
//!
//! # Example
//!
//! ```rust,ignore
//! use flashcard_forge::llm::{build_driver, LlmProtocol, LlmSettings, Provider};
//!
//! let settings = LlmSettings {
//!     base_url: "https://generativelanguage.googleapis.com".to_string(),
//!     api_key: Some("AIza...".to_string()),
//!     model: "gemini-1.5-flash".to_string(),
//!     protocol: LlmProtocol::Auto,
//!     provider: Provider::Gemini,
//! };
//! let model = build_driver(settings);
//! let reply = model.complete("Say hi").await?;
//! ```

pub mod chat_completions;
pub mod gemini;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use gemini::GeminiDriver;
pub use provider::Provider;

use std::sync::Arc;

/// LLM connection and model settings.
#[derive(Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gemini-1.5-flash`, `gpt-4o-mini`).
    pub model: String,
    /// Protocol to use for communication.
    pub protocol: LlmProtocol,
    /// Provider type (auto-detected from `base_url`).
    pub provider: Provider,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("protocol", &self.protocol)
            .field("provider", &self.provider)
            .finish()
    }
}

/// LLM protocol variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LlmProtocol {
    /// Gemini's native API for Gemini, Chat Completions for everything else.
    #[default]
    Auto,
    /// Gemini `generateContent`.
    Gemini,
    /// `OpenAI` Chat Completions API (`/v1/chat/completions`).
    Chat,
}

impl LlmProtocol {
    /// Resolve `Auto` against the detected provider.
    #[must_use]
    pub fn resolve(self, provider: &Provider) -> Self {
        match self {
            Self::Auto if *provider == Provider::Gemini => Self::Gemini,
            Self::Auto => Self::Chat,
            other => other,
        }
    }
}

/// A model that turns one prompt into one block of text.
#[async_trait::async_trait]
pub trait CompletionModel: Send + Sync + std::fmt::Debug {
    /// Send `prompt` and return the model's raw text reply.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success HTTP status, or a
    /// reply that carries no text.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Build the driver matching the configured protocol.
#[must_use]
pub fn build_driver(settings: LlmSettings) -> Arc<dyn CompletionModel> {
    match settings.protocol.resolve(&settings.provider) {
        LlmProtocol::Gemini => Arc::new(GeminiDriver::new(settings)),
        _ => Arc::new(ChatCompletionsDriver::new(settings)),
    }
}
