//! PDF text extraction backed by `pdf-extract`.

use super::provider::{ExtractionError, TextExtractor};
use async_trait::async_trait;
use std::path::Path;

/// Extracts the text layer of a PDF. Scanned pages without a text layer
/// contribute nothing.
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }
}

/// Join page texts with a single space.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let data = tokio::fs::read(path).await?;

        // pdf-extract is CPU-bound and may panic on hostile input
        let pages =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&data))
                .await
                .map_err(|e| ExtractionError::Task(e.to_string()))?
                .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        tracing::debug!(pages = pages.len(), "Read PDF text layer");
        Ok(join_pages(&pages))
    }

    fn provider_name(&self) -> &'static str {
        "pdf-extract"
    }
}
