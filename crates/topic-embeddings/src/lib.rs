//! # topic-embeddings
//!
//! Local text embedding for the topic guard using Candle.
//!
//! Maps community posts and candidate texts to unit-norm semantic vectors
//! so the guard can compare them by dot product.
//!
//! ## Features
//! - Local inference via Candle (no Python, no API)
//! - intfloat/e5-base-v2 model (768 dimensions)
//! - E5 `passage: ` instruction prefix applied to every input
//! - Automatic model file caching
//! - Batch embedding for efficiency

pub mod cache;
pub mod e5;
pub mod error;
pub mod model;

pub use cache::{fetch_model, ModelCache, ModelFiles, DEFAULT_MODEL_REPO, REQUIRED_FILES};
pub use e5::{passage_prompt, E5Embedder};
pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
