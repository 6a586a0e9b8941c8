//! Community topic profile and check-result types.

use serde::{Deserialize, Serialize};

/// Learned topic profile for one community.
///
/// The centroid is the unit-norm mean direction of the community's prior
/// post embeddings; the threshold is the minimum cosine similarity a new
/// text must reach to count as on-topic. A centroid built from embeddings
/// that cancel out exactly stays the zero vector, in which case every
/// future score is 0.0 and the community never matches until rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicProfile {
    /// Centroid vector (unit L2 norm unless degenerate)
    pub centroid: Vec<f32>,
    /// Minimum similarity for a match, in [0.50, 1.0]
    pub threshold: f32,
}

impl TopicProfile {
    /// Embedding dimension of the centroid.
    pub fn dimension(&self) -> usize {
        self.centroid.len()
    }

    /// Score a unit-norm query vector against the centroid.
    ///
    /// Both sides are unit-norm, so cosine similarity reduces to the dot
    /// product. A degenerate (zero) centroid scores 0.0 for every query.
    pub fn score(&self, query: &[f32]) -> f32 {
        self.centroid
            .iter()
            .zip(query.iter())
            .map(|(c, q)| c * q)
            .sum()
    }
}

/// Result of checking a text against a community's topic.
///
/// This is the externally visible response contract: exactly these two
/// fields, serialized as `{"match": bool, "score": number}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCheck {
    /// Whether the text clears the community's threshold
    #[serde(rename = "match")]
    pub is_match: bool,
    /// Similarity score, rounded to 4 decimal digits for reporting
    pub score: f32,
}
