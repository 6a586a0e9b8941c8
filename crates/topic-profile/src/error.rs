//! Profile-building error types.

use thiserror::Error;

/// Errors that can occur while deriving a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// No embeddings supplied
    #[error("Cannot build a profile from zero embeddings")]
    NoEmbeddings,

    /// Embeddings disagree on dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
