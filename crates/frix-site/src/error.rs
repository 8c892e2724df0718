//! Error types for render passes.

use std::path::PathBuf;

use frix_renderer::RenderError;
use frix_storage::StorageError;

/// A page's content document could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ContentLoadError {
    /// The document does not exist.
    #[error("Content document not found: {}", .path.display())]
    Missing {
        /// Document path relative to the site root.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
    /// The document exists but could not be read.
    #[error("Failed to read content document {}: {source}", .path.display())]
    Unreadable {
        /// Document path relative to the site root.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
    /// The document is not valid JSON or YAML.
    #[error("Malformed content document {}: {message}", .path.display())]
    Malformed {
        /// Document path relative to the site root.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

impl ContentLoadError {
    pub(crate) fn from_storage(path: PathBuf, source: StorageError) -> Self {
        if source.is_not_found() {
            Self::Missing { path, source }
        } else {
            Self::Unreadable { path, source }
        }
    }
}

/// Why a single page was left out of a render pass.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Content document missing or malformed.
    #[error(transparent)]
    ContentLoad(#[from] ContentLoadError),
    /// Template resolution or injection failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Failure of a whole render pass.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The key document is missing, malformed or lists an invalid URL.
    #[error("Key document {}: {message}", .path.display())]
    KeyDocument {
        /// Key document path relative to the site root.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
    /// Template listing or output writing failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// A page task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
