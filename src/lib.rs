//! Flashcard Forge
//!
//! An HTTP service that turns an uploaded PDF or PowerPoint deck into
//! question/answer flashcards using a generative model.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server with a single multipart endpoint
//! - **Intake**: Scratch storage for uploads, deleted on every exit path
//! - **Extraction**: Plain text from PDF and PPTX files
//! - **LLM**: Protocol-agnostic single-shot completion drivers
//! - **Flashcards**: Prompting and normalization of the model reply
//!
//! # Modules
//!
//! - [`api`]: HTTP handlers and error mapping
//! - [`extraction`]: Document text extractors
//! - [`flashcards`]: Card types, prompt, normalizer and the generation service
//! - [`intake`]: Upload lifecycle
//! - [`llm`]: Model driver trait and implementations

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod extraction;
pub mod flashcards;
pub mod intake;
pub mod llm;
pub mod server;
pub mod telemetry;

use crate::config::AppConfig;
use flashcards::FlashcardService;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Generation pipeline.
    pub flashcards: Arc<FlashcardService>,
}
