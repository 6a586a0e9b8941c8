//! Candle-based E5 embedding implementation.
//!
//! Uses intfloat/e5-base-v2 (BERT encoder, 768 dimensions). E5 models are
//! trained with instruction prefixes; the guard encodes every text, both
//! community posts and candidate texts, with the `passage: ` prefix so
//! corpus and query live in the same region of the embedding space.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::cache::{fetch_model, ModelCache, ModelFiles};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Embedding dimension for e5-base-v2
pub const EMBEDDING_DIM: usize = 768;

/// Maximum sequence length
pub const MAX_SEQ_LENGTH: usize = 512;

/// E5 instruction prefix applied to every encoded text
const PASSAGE_PREFIX: &str = "passage: ";

/// Prefix a text the way e5 expects its inputs.
pub fn passage_prompt(text: &str) -> String {
    format!("{}{}", PASSAGE_PREFIX, text)
}

/// Candle-based embedder for intfloat/e5-base-v2.
pub struct E5Embedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl E5Embedder {
    /// Load the embedding model from cache (downloading if needed).
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let files = fetch_model(cache)?;
        Self::load_from_files(&files)
    }

    /// Load with default cache settings
    pub fn load_default() -> Result<Self, EmbeddingError> {
        let cache = ModelCache::default();
        Self::load(&cache)
    }

    /// Load from explicit file paths
    pub fn load_from_files(files: &ModelFiles) -> Result<Self, EmbeddingError> {
        info!("Loading embedding model...");

        // CPU inference; accelerator support would come in behind a feature flag
        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(&files.config)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(
            dim = EMBEDDING_DIM,
            max_seq = MAX_SEQ_LENGTH,
            "Model loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: "intfloat/e5-base-v2".to_string(),
                dimension: EMBEDDING_DIM,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }

    /// Mean pooling over token embeddings, weighted by the attention mask
    /// so padding tokens contribute nothing.
    fn masked_mean(
        &self,
        token_embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(token_embeddings.shape())?
            .to_dtype(DType::F32)?;

        let summed = token_embeddings.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(summed.broadcast_div(&counts)?)
    }
}

impl EmbeddingModel for E5Embedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut embeddings = self.embed_batch(&[text])?;
        Ok(embeddings.remove(0))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(count = texts.len(), "Embedding batch");

        let prompts: Vec<String> = texts.iter().map(|t| passage_prompt(t)).collect();
        let encodings = self
            .tokenizer
            .encode_batch(prompts, true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // Pad every sequence in the batch to the longest (capped) length
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LENGTH);

        let batch_size = texts.len();
        let mut id_rows: Vec<u32> = Vec::with_capacity(batch_size * max_len);
        let mut mask_rows: Vec<u32> = Vec::with_capacity(batch_size * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let keep = ids.len().min(max_len);

            id_rows.extend_from_slice(&ids[..keep]);
            id_rows.extend(std::iter::repeat(0).take(max_len - keep));
            mask_rows.extend_from_slice(&mask[..keep]);
            mask_rows.extend(std::iter::repeat(0).take(max_len - keep));
        }

        let input_ids = Tensor::from_vec(id_rows, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask_rows, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = self.masked_mean(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_vec2()?;

        let embeddings: Vec<Embedding> = rows.into_iter().map(Embedding::new).collect();

        debug!(
            count = embeddings.len(),
            dim = EMBEDDING_DIM,
            "Batch complete"
        );

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_prompt() {
        assert_eq!(passage_prompt("cats are pets"), "passage: cats are pets");
        assert_eq!(passage_prompt(""), "passage: ");
    }

    // Model-backed tests download ~400MB on first run:
    // cargo test -p topic-embeddings -- --ignored

    #[test]
    #[ignore = "requires model download"]
    fn test_load_model() {
        let embedder = E5Embedder::load_default().unwrap();
        assert_eq!(embedder.info().dimension, EMBEDDING_DIM);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embed_is_unit_norm() {
        let embedder = E5Embedder::load_default().unwrap();
        let emb = embedder.embed("my cat is sleeping").unwrap();
        assert_eq!(emb.dimension(), EMBEDDING_DIM);
        let norm: f32 = emb.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_batch_matches_single() {
        let embedder = E5Embedder::load_default().unwrap();
        let single = embedder.embed("dogs are also pets").unwrap();
        let batch = embedder
            .embed_batch(&["dogs are also pets", "the stock market crashed today"])
            .unwrap();
        assert_eq!(batch.len(), 2);
        let sim = single.cosine_similarity(&batch[0]);
        assert!(sim > 0.999);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_on_topic_scores_higher() {
        let embedder = E5Embedder::load_default().unwrap();
        let cat = embedder.embed("I love my cat").unwrap();
        let similar = embedder.embed("my cat is sleeping").unwrap();
        let unrelated = embedder.embed("the stock market crashed today").unwrap();

        let sim_on = cat.cosine_similarity(&similar);
        let sim_off = cat.cosine_similarity(&unrelated);
        assert!(sim_on > sim_off);
    }
}
