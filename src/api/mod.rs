pub mod error;
pub mod flashcards;

use axum::{Router, routing::post};

use crate::AppState;

pub use error::{ApiError, ErrorBody};
pub use flashcards::FlashcardsResponse;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/create-flashcards",
        post(flashcards::create_flashcards_handler),
    )
}
