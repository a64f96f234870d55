//! End-to-end flashcard generation for one upload.

use std::sync::Arc;
use std::time::Instant;

use super::{CardRecord, build_prompt, normalize};
use crate::extraction::{ExtractionError, TextExtractor};
use crate::intake::{IncomingFile, IntakeError, IntakeManager, UploadHandle};
use crate::llm::CompletionModel;

/// Why a request produced no flashcards.
///
/// A reply the normalizer cannot parse is not an error; it yields an empty
/// list instead.
#[derive(Debug, thiserror::Error)]
pub enum FlashcardError {
    /// Rejected or failed to store the upload.
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Unsupported format or the document could not be read.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Network, auth or quota failure talking to the model.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[source] anyhow::Error),
}

/// Runs intake, extraction, prompting and normalization for one upload.
///
/// Holds only shared read-only collaborators; every call owns its own
/// [`UploadHandle`] and releases it before returning.
#[derive(Debug, Clone)]
pub struct FlashcardService {
    intake: Arc<IntakeManager>,
    extractor: Arc<dyn TextExtractor>,
    model: Arc<dyn CompletionModel>,
}

impl FlashcardService {
    pub fn new(
        intake: Arc<IntakeManager>,
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn CompletionModel>,
    ) -> Self {
        Self {
            intake,
            extractor,
            model,
        }
    }

    pub fn intake(&self) -> &IntakeManager {
        &self.intake
    }

    /// Generate up to `count` flashcards from an uploaded document.
    ///
    /// The stored upload is deleted whether this succeeds or fails.
    pub async fn create_flashcards(
        &self,
        file: Option<IncomingFile>,
        count: u32,
    ) -> Result<Vec<CardRecord>, FlashcardError> {
        let mut handle = self.intake.accept(file).await?;
        let upload_id = handle.id();

        let result = self.generate(&mut handle, count).await;
        self.intake.release(handle).await;

        match &result {
            Ok(cards) => tracing::info!(%upload_id, cards = cards.len(), "Flashcards generated"),
            Err(e) => tracing::error!(%upload_id, error = %e, "Flashcard generation failed"),
        }
        result
    }

    async fn generate(
        &self,
        handle: &mut UploadHandle,
        count: u32,
    ) -> Result<Vec<CardRecord>, FlashcardError> {
        handle.mark_in_use();
        let text = self.extractor.extract(handle.path()).await?;

        let prompt = build_prompt(&text, count);
        let started = Instant::now();
        let reply = self
            .model
            .complete(&prompt)
            .await
            .map_err(FlashcardError::ModelInvocation)?;

        tracing::info!(
            name: "llm.completed",
            model = %self.model.model_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_len = reply.len(),
            "Model replied"
        );

        Ok(normalize(&reply, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionDispatcher;
    use crate::flashcards::Flashcard;
    use crate::intake::HandleState;
    use axum::body::Bytes;
    use std::path::Path;
    use std::sync::Mutex;

    /// Returns a canned reply and remembers the prompt it was given.
    #[derive(Debug)]
    struct ScriptedModel {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl CompletionModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(anyhow::Error::msg)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    /// Checks the upload is on disk while being read.
    #[derive(Debug)]
    struct FixedText(&'static str);

    #[async_trait::async_trait]
    impl TextExtractor for FixedText {
        async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
            assert!(path.exists(), "upload must exist during extraction");
            Ok(self.0.to_string())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn upload(name: &str) -> Option<IncomingFile> {
        Some(IncomingFile {
            filename: Some(name.to_string()),
            bytes: Bytes::from_static(b"bytes"),
        })
    }

    async fn service(
        dir: &Path,
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn CompletionModel>,
    ) -> FlashcardService {
        let intake = Arc::new(IntakeManager::init(dir).await.unwrap());
        FlashcardService::new(intake, extractor, model)
    }

    fn is_empty_dir(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_success_returns_cards_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let model = ScriptedModel::ok("```json\n[{\"front\":\"Q\",\"back\":\"A\"}]\n```");
        let svc = service(
            root.path(),
            Arc::new(FixedText("The mitochondria is the powerhouse.")),
            Arc::clone(&model) as Arc<dyn CompletionModel>,
        )
        .await;

        let cards = svc.create_flashcards(upload("bio.pdf"), 4).await.unwrap();

        assert_eq!(
            cards,
            vec![CardRecord::Card(Flashcard {
                front: "Q".into(),
                back: "A".into()
            })]
        );
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("generate 4 flashcards"));
        assert!(prompts[0].contains("The mitochondria is the powerhouse."));
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_empty_success() {
        let root = tempfile::tempdir().unwrap();
        let svc = service(
            root.path(),
            Arc::new(FixedText("text")),
            ScriptedModel::ok("Sorry, I can't help with that."),
        )
        .await;

        let cards = svc.create_flashcards(upload("a.pptx"), 10).await.unwrap();
        assert!(cards.is_empty());
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_model_failure_still_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let svc = service(
            root.path(),
            Arc::new(FixedText("text")),
            ScriptedModel::failing("quota exceeded"),
        )
        .await;

        let err = svc.create_flashcards(upload("a.pdf"), 10).await.unwrap_err();
        assert!(matches!(err, FlashcardError::ModelInvocation(_)));
        assert!(err.to_string().contains("quota exceeded"));
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_unsupported_format_still_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let model = ScriptedModel::ok("[]");
        let svc = service(
            root.path(),
            Arc::new(ExtractionDispatcher::default()),
            Arc::clone(&model) as Arc<dyn CompletionModel>,
        )
        .await;

        let err = svc.create_flashcards(upload("notes.txt"), 10).await.unwrap_err();
        assert!(matches!(
            err,
            FlashcardError::Extraction(ExtractionError::UnsupportedFormat { .. })
        ));
        assert_eq!(err.to_string(), "Unsupported file format");
        assert!(model.prompts.lock().unwrap().is_empty());
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_corrupt_document_still_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let svc = service(
            root.path(),
            Arc::new(ExtractionDispatcher::default()),
            ScriptedModel::ok("[]"),
        )
        .await;

        let err = svc.create_flashcards(upload("deck.pptx"), 10).await.unwrap_err();
        assert!(matches!(err, FlashcardError::Extraction(ExtractionError::Pptx(_))));
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_invalid_upload_has_no_side_effect() {
        let root = tempfile::tempdir().unwrap();
        let model = ScriptedModel::ok("[]");
        let svc = service(
            root.path(),
            Arc::new(FixedText("text")),
            Arc::clone(&model) as Arc<dyn CompletionModel>,
        )
        .await;

        let err = svc.create_flashcards(None, 10).await.unwrap_err();
        assert!(matches!(err, FlashcardError::Intake(IntakeError::MissingFile)));
        assert!(model.prompts.lock().unwrap().is_empty());
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_handle_marked_in_use_during_extraction() {
        #[derive(Debug)]
        struct StateProbe;

        #[async_trait::async_trait]
        impl TextExtractor for StateProbe {
            async fn extract(&self, _path: &Path) -> Result<String, ExtractionError> {
                Ok(String::new())
            }

            fn provider_name(&self) -> &'static str {
                "probe"
            }
        }

        let root = tempfile::tempdir().unwrap();
        let svc = service(root.path(), Arc::new(StateProbe), ScriptedModel::ok("[]")).await;

        let mut handle = svc.intake().accept(upload("x.pdf")).await.unwrap();
        svc.generate(&mut handle, 1).await.unwrap();
        assert_eq!(handle.state(), HandleState::InUse);
        svc.intake().release(handle).await;
        assert!(is_empty_dir(root.path()));
    }
}
