//! Document text extraction.
//!
//! Uploaded decks and PDFs are turned into plain text before prompting.
//! Extraction itself is delegated to format libraries; this module only
//! decides which one to call.
//!
//! # Extractors
//!
//! - [`PdfExtractor`] - text layer of a PDF via `pdf-extract`
//! - [`PptxExtractor`] - shape text of a PowerPoint deck via `zip` + `quick-xml`
//! - [`ExtractionDispatcher`] - picks one of the above by file extension
//!
//! # Usage
//!
//! ```rust,ignore
//! use flashcard_forge::extraction::{ExtractionDispatcher, TextExtractor};
//!
//! let extractor = ExtractionDispatcher::default();
//! let text = extractor.extract(Path::new("uploads/3f2a....pptx")).await?;
//! ```

mod dispatcher;
mod pdf;
mod pptx;
mod provider;

pub use dispatcher::ExtractionDispatcher;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use provider::{DocumentKind, ExtractionError, TextExtractor};
