use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::api;
use crate::config::AppConfig;
use crate::extraction::ExtractionDispatcher;
use crate::flashcards::FlashcardService;
use crate::intake::IntakeManager;
use crate::llm::build_driver;

/// Assemble the router around already-built state.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    api::router()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = config.llm.settings();
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = ?settings.provider,
        protocol = ?settings.protocol,
        has_api_key = settings.api_key.is_some(),
        "LLM configuration loaded"
    );

    let intake = IntakeManager::init(config.storage.scratch_dir.clone())
        .await
        .with_context(|| {
            format!(
                "failed to create scratch directory {}",
                config.storage.scratch_dir.display()
            )
        })?;

    let flashcards = FlashcardService::new(
        Arc::new(intake),
        Arc::new(ExtractionDispatcher::default()),
        build_driver(settings),
    );

    let state = AppState {
        config: Arc::clone(&config),
        flashcards: Arc::new(flashcards),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        name: "server.started",
        address = %addr,
        scratch_dir = %config.storage.scratch_dir.display(),
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
