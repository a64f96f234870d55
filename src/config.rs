use crate::llm::{LlmProtocol, LlmSettings, Provider};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory holding uploads while they are processed
    #[arg(long, env = "SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub flashcards: FlashcardConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Upper bound on the request body, multipart framing included.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Not validated here; a missing key is reported by the provider on first use.
    pub api_key: Option<String>,
    pub protocol: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FlashcardConfig {
    pub default_card_count: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub json_logs: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 5000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.max_upload_bytes", 50 * 1024 * 1024)?
            .set_default("storage.scratch_dir", "uploads")?
            .set_default("llm.base_url", "https://generativelanguage.googleapis.com")?
            .set_default("llm.model", "gemini-1.5-flash")?
            .set_default("llm.protocol", "auto")?
            .set_default("flashcards.default_card_count", 10)?
            .set_default("telemetry.json_logs", false)?;

        // 2. Config file: explicit path must exist, ./config.* is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Legacy variable names (overrides, so they beat FLASHCARDS_*)
        if let Ok(val) = env::var("LLM_BASE_URL") {
            builder = builder.set_override("llm.base_url", val)?;
        }
        if let Ok(val) = env::var("LLM_MODEL") {
            builder = builder.set_override("llm.model", val)?;
        }
        if let Some(key) = env::var("API_KEY")
            .or_else(|_| env::var("LLM_API_KEY"))
            .ok()
            .filter(|s| !s.trim().is_empty())
        {
            builder = builder.set_override("llm.api_key", key)?;
        }

        // 4. Prefixed environment, e.g. FLASHCARDS_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("FLASHCARDS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 5. CLI flags (and their env fallbacks via clap) win over everything
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(dir) = cli.scratch_dir {
            builder = builder.set_override("storage.scratch_dir", dir.to_string_lossy().as_ref())?;
        }
        if let Some(json) = cli.json_logs {
            builder = builder.set_override("telemetry.json_logs", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

impl LlmConfig {
    /// Resolve provider and protocol into driver settings.
    pub fn settings(&self) -> LlmSettings {
        let protocol = match self.protocol.to_lowercase().as_str() {
            "gemini" => LlmProtocol::Gemini,
            "chat" => LlmProtocol::Chat,
            _ => LlmProtocol::Auto,
        };

        LlmSettings {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone().filter(|s| !s.trim().is_empty()),
            model: self.model.clone(),
            protocol,
            provider: Provider::detect_from_url(&self.base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(base_url: &str, protocol: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            model: "m".to_string(),
            api_key: Some("  ".to_string()),
            protocol: protocol.to_string(),
        }
    }

    #[test]
    fn test_settings_detects_gemini() {
        let settings = llm("https://generativelanguage.googleapis.com", "auto").settings();
        assert_eq!(settings.provider, Provider::Gemini);
        assert_eq!(settings.protocol, LlmProtocol::Auto);
    }

    #[test]
    fn test_settings_blank_key_is_none() {
        let settings = llm("http://localhost:8080", "chat").settings();
        assert!(settings.api_key.is_none());
        assert_eq!(settings.protocol, LlmProtocol::Chat);
    }

    #[test]
    fn test_unknown_protocol_falls_back_to_auto() {
        let settings = llm("http://localhost:8080", "carrier-pigeon").settings();
        assert_eq!(settings.protocol, LlmProtocol::Auto);
    }
}
