//! Guard error types.

use thiserror::Error;
use topic_embeddings::EmbeddingError;
use topic_profile::ProfileError;
use topic_storage::StorageError;

/// Errors surfaced by guard operations.
///
/// Precondition violations (operating on a guard that was never
/// initialized, or after shutdown) are programming errors and panic
/// instead of appearing here.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Embedding model failed to load or the store could not be opened
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Embedding computation failed
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Durable store operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Profile derivation failed
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// A lock was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}
