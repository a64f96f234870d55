//! Provider detection and endpoint construction.
//!
//! Providers differ in URL layout and authentication header; everything else
//! is handled by the protocol drivers.

/// Supported LLM providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini (generativelanguage.googleapis.com)
    Gemini,
    /// `OpenRouter` (openrouter.ai), chat under `/api/v1`
    OpenRouter,
    /// Groq (groq.com), chat under `/openai/v1`
    Groq,
    /// `OpenAI` or any compatible server, chat under `/v1`
    Generic,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let provider = Provider::detect_from_url("https://generativelanguage.googleapis.com");
    /// assert_eq!(provider, Provider::Gemini);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("generativelanguage.googleapis.com") {
            Self::Gemini
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("groq.com") {
            Self::Groq
        } else {
            Self::Generic
        }
    }

    /// Build the chat completions URL for this provider.
    ///
    /// Gemini exposes its OpenAI-compatible surface under `/v1beta/openai`.
    #[must_use]
    pub fn build_chat_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::Gemini => format!("{base}/v1beta/openai/chat/completions"),
            Self::OpenRouter => format!("{base}/api/v1/chat/completions"),
            Self::Groq => format!("{base}/openai/v1/chat/completions"),
            Self::Generic => format!("{base}/v1/chat/completions"),
        }
    }

    /// Build the native `generateContent` URL for a Gemini model.
    #[must_use]
    pub fn build_generate_content_url(base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');
        format!("{base}/v1beta/models/{model}:generateContent")
    }
}
