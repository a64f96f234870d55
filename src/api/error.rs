//! HTTP error mapping.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::flashcards::FlashcardError;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The multipart body could not be read.
    #[error("Failed to read multipart request: {0}")]
    Multipart(String),

    /// The body exceeded the configured upload limit.
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// `number_of_cards` was present but not a non-negative integer.
    #[error("number_of_cards must be a non-negative integer, got '{0}'")]
    InvalidCardCount(String),

    #[error(transparent)]
    Flashcards(#[from] FlashcardError),
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(e.body_text())
        } else {
            Self::Multipart(e.body_text())
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use crate::extraction::ExtractionError;
        use crate::intake::IntakeError;

        match self {
            Self::Multipart(_) => (StatusCode::BAD_REQUEST, "MULTIPART_ERROR"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::InvalidCardCount(_) => (StatusCode::BAD_REQUEST, "INVALID_CARD_COUNT"),
            Self::Flashcards(e) => match e {
                FlashcardError::Intake(IntakeError::MissingFile) => {
                    (StatusCode::BAD_REQUEST, "MISSING_FILE")
                }
                FlashcardError::Intake(IntakeError::EmptyFilename) => {
                    (StatusCode::BAD_REQUEST, "EMPTY_FILENAME")
                }
                FlashcardError::Intake(IntakeError::Io(_)) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
                }
                FlashcardError::Extraction(ExtractionError::UnsupportedFormat { .. }) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "UNSUPPORTED_FORMAT")
                }
                FlashcardError::Extraction(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "EXTRACTION_ERROR")
                }
                FlashcardError::ModelInvocation(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: self.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionError;
    use crate::intake::IntakeError;

    #[test]
    fn test_invalid_upload_is_400() {
        let err = ApiError::from(FlashcardError::Intake(IntakeError::MissingFile));
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "MISSING_FILE"));
        assert_eq!(err.to_string(), "No file part in the request");
    }

    #[test]
    fn test_unsupported_format_is_500() {
        let err = ApiError::from(FlashcardError::Extraction(
            ExtractionError::UnsupportedFormat {
                extension: Some("txt".into()),
            },
        ));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Unsupported file format");
    }

    #[test]
    fn test_model_failure_is_500() {
        let err = ApiError::from(FlashcardError::ModelInvocation(anyhow::anyhow!("timeout")));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_ERROR")
        );
    }
}
