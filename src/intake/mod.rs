//! Transient storage for uploaded documents.
//!
//! Every upload is written to the scratch directory under a fresh UUID v4
//! name, so two requests carrying the same original filename can never
//! touch the same file. The original name is kept only to recover the
//! extension, which the extractor dispatches on.
//!
//! An [`UploadHandle`] owns its file. Callers hand it back through
//! [`IntakeManager::release`] on every exit path; if a handle is dropped
//! without being released (a panic, a cancelled request), its `Drop` impl
//! removes the file instead. Either way the file is deleted exactly once.

use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Longest extension we carry over from the original filename.
const MAX_EXTENSION_LEN: usize = 16;

/// A `file` part as it arrived in the request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename supplied by the client, if any.
    pub filename: Option<String>,
    /// Raw file contents.
    pub bytes: Bytes,
}

/// Where an upload is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Written to scratch storage.
    Created,
    /// Being read by the extraction step.
    InUse,
    /// File removed; nothing left on disk.
    Deleted,
}

/// Errors raised while accepting an upload.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// The request carried no `file` part.
    #[error("No file part in the request")]
    MissingFile,

    /// The `file` part had an empty filename.
    #[error("No selected file")]
    EmptyFilename,

    /// Writing to scratch storage failed.
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl IntakeError {
    /// Whether this is the client's fault (bad upload) rather than ours.
    pub fn is_invalid_upload(&self) -> bool {
        matches!(self, Self::MissingFile | Self::EmptyFilename)
    }
}

/// Exclusive ownership of one stored upload.
#[derive(Debug)]
pub struct UploadHandle {
    id: Uuid,
    original_filename: String,
    path: PathBuf,
    state: HandleState,
}

impl UploadHandle {
    /// Collision-resistant identity of this upload.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Filename as the client sent it.
    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    /// Location in scratch storage.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Mark the file as handed to processing.
    pub fn mark_in_use(&mut self) {
        if self.state == HandleState::Created {
            self.state = HandleState::InUse;
        }
    }
}

impl Drop for UploadHandle {
    fn drop(&mut self) {
        if self.state == HandleState::Deleted {
            return;
        }
        tracing::warn!(
            upload_id = %self.id,
            path = %self.path.display(),
            "Upload still on disk when its handle dropped; removing file"
        );
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(upload_id = %self.id, error = %e, "Failed to remove abandoned upload");
            }
        }
    }
}

/// Owns the scratch directory and hands out [`UploadHandle`]s.
#[derive(Debug)]
pub struct IntakeManager {
    scratch_dir: PathBuf,
}

impl IntakeManager {
    /// Create the scratch directory if it does not exist yet.
    ///
    /// Safe to call repeatedly; meant to run once at startup.
    pub async fn init(scratch_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let scratch_dir = scratch_dir.into();
        tokio::fs::create_dir_all(&scratch_dir).await?;
        tracing::info!(scratch_dir = %scratch_dir.display(), "Scratch directory ready");
        Ok(Self { scratch_dir })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Store an upload under a fresh identity.
    ///
    /// Fails with [`IntakeError::MissingFile`] or
    /// [`IntakeError::EmptyFilename`] before touching the disk.
    pub async fn accept(&self, file: Option<IncomingFile>) -> Result<UploadHandle, IntakeError> {
        let file = file.ok_or(IntakeError::MissingFile)?;
        let original_filename = file
            .filename
            .filter(|name| !name.is_empty())
            .ok_or(IntakeError::EmptyFilename)?;

        let id = Uuid::new_v4();
        let path = match sanitized_extension(&original_filename) {
            Some(ext) => self.scratch_dir.join(format!("{id}.{ext}")),
            None => self.scratch_dir.join(id.to_string()),
        };

        // create_new: a name clash means something is badly wrong, never overwrite
        let mut out = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            out.write_all(&file.bytes).await?;
            out.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(out);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(IntakeError::Io(e));
        }
        drop(out);

        tracing::info!(
            name: "intake.accepted",
            upload_id = %id,
            size = file.bytes.len(),
            "Stored upload"
        );

        Ok(UploadHandle {
            id,
            original_filename,
            path,
            state: HandleState::Created,
        })
    }

    /// Delete the stored file. Consumes the handle.
    ///
    /// If removal fails the handle's `Drop` tries once more.
    pub async fn release(&self, mut handle: UploadHandle) {
        handle.remove_file().await;
    }
}

impl UploadHandle {
    /// Leaves the state untouched when the file could not be removed.
    async fn remove_file(&mut self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(name: "intake.released", upload_id = %self.id, "Removed upload");
                self.state = HandleState::Deleted;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(upload_id = %self.id, "Upload already gone at release");
                self.state = HandleState::Deleted;
            }
            Err(e) => {
                tracing::error!(upload_id = %self.id, error = %e, "Failed to remove upload");
            }
        }
    }
}

/// Lower-cased extension of `filename`, if it is plain ASCII alphanumerics.
fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}
