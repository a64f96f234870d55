//! Core trait and types for text extractors.

use async_trait::async_trait;
use std::path::Path;

/// Document formats we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML presentation.
    Pptx,
}

impl DocumentKind {
    /// Classify a path by its extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if ext.eq_ignore_ascii_case("pptx") {
            Some(Self::Pptx)
        } else {
            None
        }
    }
}

/// Errors that can occur during text extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The file extension is neither `.pdf` nor `.pptx`.
    #[error("Unsupported file format")]
    UnsupportedFormat {
        /// Extension as uploaded, if any.
        extension: Option<String>,
    },

    /// The PDF parser rejected the document.
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// The presentation could not be opened or read.
    #[error("PPTX extraction failed: {0}")]
    Pptx(String),

    /// An I/O error occurred while reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Trait for document text extractors.
///
/// Implementors read one stored file and return its plain text. They are
/// called at most once per file and must not retry internally.
#[async_trait]
pub trait TextExtractor: Send + Sync + std::fmt::Debug {
    /// Extract plain text from the file at `path`.
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;

    /// Get the extractor name for logging and debugging.
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_case_insensitive() {
        assert_eq!(DocumentKind::from_path(Path::new("a.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("deck.PpTx")), Some(DocumentKind::Pptx));
    }

    #[test]
    fn test_kind_rejects_other_extensions() {
        assert_eq!(DocumentKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("deck.ppt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }
}
