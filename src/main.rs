//! Flashcard Forge server
//!
//! Entry point for the flashcard generation service.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use flashcard_forge::{config::AppConfig, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load()?;

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(config.telemetry.json_logs);

    server::start_server(Arc::new(config)).await
}
