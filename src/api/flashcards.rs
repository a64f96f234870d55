//! Flashcard generation endpoint.
//!
//! Accepts a multipart upload of a deck or PDF and answers with the cards
//! the model produced.

use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Json,
};
use serde::Serialize;

use super::error::ApiError;
use crate::AppState;
use crate::flashcards::CardRecord;
use crate::intake::IncomingFile;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

/// Optional multipart field with the number of cards to ask for.
const COUNT_FIELD: &str = "number_of_cards";

/// Response for a successful generation.
#[derive(Debug, Serialize)]
pub struct FlashcardsResponse {
    /// Cards in the order the model returned them. May be empty.
    pub flashcards: Vec<CardRecord>,
}

/// Generate flashcards from an uploaded document.
///
/// POST /create-flashcards
///
/// Fields: `file` (a `.pdf` or `.pptx` part with a filename) and an optional
/// `number_of_cards`. A `file` field sent without a filename is not a file
/// part and is ignored.
pub async fn create_flashcards_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Multipart(e.body_text()))?;

    let mut file: Option<IncomingFile> = None;
    let mut count_value: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let Some(filename) = field.file_name().map(ToString::to_string) else {
                    continue;
                };
                let bytes = field.bytes().await?;
                file = Some(IncomingFile {
                    filename: Some(filename),
                    bytes,
                });
            }
            Some(COUNT_FIELD) => {
                count_value = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let count = parse_card_count(
        count_value.as_deref(),
        state.config.flashcards.default_card_count,
    )?;

    tracing::info!(
        has_file = file.is_some(),
        number_of_cards = count,
        "Received flashcard request"
    );

    let flashcards = state.flashcards.create_flashcards(file, count).await?;
    Ok(Json(FlashcardsResponse { flashcards }))
}

/// Absent or blank means the configured default.
fn parse_card_count(value: Option<&str>, default: u32) -> Result<u32, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v
            .parse()
            .ok()
            .ok_or_else(|| ApiError::InvalidCardCount(v.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card_count() {
        assert_eq!(parse_card_count(None, 10).unwrap(), 10);
        assert_eq!(parse_card_count(Some("  "), 10).unwrap(), 10);
        assert_eq!(parse_card_count(Some(" 25 "), 10).unwrap(), 25);
        assert!(matches!(
            parse_card_count(Some("ten"), 10),
            Err(ApiError::InvalidCardCount(v)) if v == "ten"
        ));
        assert!(parse_card_count(Some("-3"), 10).is_err());
    }
}
