//! Embedding model trait and vector type.

use crate::error::EmbeddingError;

/// A unit-norm embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding components (normalized to unit length)
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding, normalizing to unit length.
    ///
    /// A zero vector passes through unchanged; it has no direction to
    /// normalize onto.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values }
    }

    /// Wrap an already-normalized vector without touching it.
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Cosine similarity with another embedding.
    ///
    /// Both vectors are unit-norm, so this is the plain dot product.
    /// Returns 0.0 on dimension mismatch.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "intfloat/e5-base-v2")
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length in tokens
    pub max_sequence_length: usize,
}

/// Trait for embedding models.
///
/// The ordering contract matters: `embed_batch` output order matches input
/// order. Implementations must be thread-safe (Send + Sync) for concurrent
/// scoring.
pub trait EmbeddingModel: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts in one call.
    ///
    /// Default implementation loops over `embed`; real providers override
    /// this with true batching.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Generate embeddings for multiple owned strings.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        self.embed_batch(&refs)
    }
}
