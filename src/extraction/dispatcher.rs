//! Routes a stored upload to the extractor for its file kind.

use super::pdf::PdfExtractor;
use super::pptx::PptxExtractor;
use super::provider::{DocumentKind, ExtractionError, TextExtractor};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Dispatches purely on file extension (case-insensitive).
///
/// `.pdf` goes to the PDF extractor, `.pptx` to the presentation extractor,
/// anything else fails with [`ExtractionError::UnsupportedFormat`]. The
/// chosen extractor is called exactly once and its error is returned as is.
#[derive(Debug, Clone)]
pub struct ExtractionDispatcher {
    pdf: Arc<dyn TextExtractor>,
    pptx: Arc<dyn TextExtractor>,
}

impl Default for ExtractionDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(PdfExtractor::new()), Arc::new(PptxExtractor::new()))
    }
}

impl ExtractionDispatcher {
    /// Build a dispatcher over explicit extractors.
    pub fn new(pdf: Arc<dyn TextExtractor>, pptx: Arc<dyn TextExtractor>) -> Self {
        Self { pdf, pptx }
    }

    fn extractor_for(&self, kind: DocumentKind) -> &Arc<dyn TextExtractor> {
        match kind {
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::Pptx => &self.pptx,
        }
    }
}

#[async_trait]
impl TextExtractor for ExtractionDispatcher {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let Some(kind) = DocumentKind::from_path(path) else {
            return Err(ExtractionError::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned()),
            });
        };

        let extractor = self.extractor_for(kind);

        tracing::debug!(
            kind = ?kind,
            extractor = extractor.provider_name(),
            "Dispatching document for text extraction"
        );

        let text = extractor.extract(path).await?;

        tracing::info!(
            name: "extraction.completed",
            kind = ?kind,
            chars = text.chars().count(),
            "Extracted document text"
        );

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "dispatcher"
    }
}
