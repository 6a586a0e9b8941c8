//! Profile derivation: centroid and acceptance threshold.

use topic_embeddings::Embedding;
use topic_types::TopicProfile;
use tracing::debug;

use crate::error::ProfileError;

/// Lower bound on every derived threshold.
///
/// A community with one post, or several near-identical posts, has
/// sigma close to zero; without the floor its threshold would collapse
/// toward mu and reject almost everything, or (with a pathological
/// sample) drop low enough to accept anything.
pub const THRESHOLD_FLOOR: f32 = 0.50;

/// Derive a (centroid, threshold) profile from a community's embeddings.
///
/// The centroid is the renormalized component-wise mean. If the mean has
/// exactly zero norm (embeddings cancel out), the zero vector is kept as
/// the centroid: every future similarity against it is 0.0 and the
/// community stops matching until it is rebuilt from more diverse posts.
///
/// The threshold is `max(mu - 2*sigma, 0.50)` over the cosine similarity
/// of each input against the centroid, with population standard
/// deviation: a one-sided lower bound on "typical" similarity for this
/// community.
///
/// Pure function: no side effects, deterministic for identical input.
pub fn build_profile(embeddings: &[Embedding]) -> Result<TopicProfile, ProfileError> {
    if embeddings.is_empty() {
        return Err(ProfileError::NoEmbeddings);
    }

    let dim = embeddings[0].dimension();
    for emb in embeddings {
        if emb.dimension() != dim {
            return Err(ProfileError::DimensionMismatch {
                expected: dim,
                actual: emb.dimension(),
            });
        }
    }

    // Component-wise mean
    let n = embeddings.len() as f32;
    let mut centroid = vec![0.0f32; dim];
    for emb in embeddings {
        for (acc, v) in centroid.iter_mut().zip(emb.values.iter()) {
            *acc += v;
        }
    }
    for acc in centroid.iter_mut() {
        *acc /= n;
    }

    // Renormalize unless the mean cancelled out to zero
    let norm: f32 = centroid.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in centroid.iter_mut() {
            *v /= norm;
        }
    }

    // Similarity of every input against the centroid
    let sims: Vec<f32> = embeddings
        .iter()
        .map(|emb| dot(&emb.values, &centroid))
        .collect();

    let mu = sims.iter().map(|&s| s as f64).sum::<f64>() / sims.len() as f64;
    let variance = sims
        .iter()
        .map(|&s| {
            let d = s as f64 - mu;
            d * d
        })
        .sum::<f64>()
        / sims.len() as f64;
    let sigma = variance.sqrt();

    let threshold = ((mu - 2.0 * sigma) as f32).max(THRESHOLD_FLOOR);

    debug!(
        examples = embeddings.len(),
        threshold, "Derived topic profile"
    );

    Ok(TopicProfile {
        centroid,
        threshold,
    })
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn unit(values: Vec<f32>) -> Embedding {
        Embedding::new(values)
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = build_profile(&[]);
        assert!(matches!(result, Err(ProfileError::NoEmbeddings)));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let result = build_profile(&[unit(vec![1.0, 0.0]), unit(vec![1.0, 0.0, 0.0])]);
        assert!(matches!(
            result,
            Err(ProfileError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_single_embedding() {
        let profile = build_profile(&[unit(vec![3.0, 4.0])]).unwrap();
        // Centroid is the embedding itself; its self-similarity is 1, so
        // sigma is 0 and the threshold sits at mu = 1.
        assert!((profile.centroid[0] - 0.6).abs() < 1e-5);
        assert!((profile.centroid[1] - 0.8).abs() < 1e-5);
        assert!((profile.threshold - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_centroid_is_unit_norm() {
        let profile = build_profile(&[
            unit(vec![1.0, 0.0, 0.0]),
            unit(vec![0.0, 1.0, 0.0]),
            unit(vec![0.0, 0.0, 1.0]),
        ])
        .unwrap();
        let norm: f32 = profile.centroid.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_centroid_unit_norm_random_inputs() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let embeddings: Vec<Embedding> = (0..8)
                .map(|_| {
                    let values: Vec<f32> = (0..16).map(|_| rng.gen_range(-1.0..1.0)).collect();
                    Embedding::new(values)
                })
                .collect();
            let profile = build_profile(&embeddings).unwrap();
            let norm: f32 = profile.centroid.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4, "norm was {}", norm);
            assert!(profile.threshold >= THRESHOLD_FLOOR);
        }
    }

    #[test]
    fn test_threshold_floor_applies() {
        // Nearly opposing directions: mean similarity is low, sigma is 0,
        // mu - 2*sigma lands under the floor.
        let profile =
            build_profile(&[unit(vec![1.0, 0.0]), unit(vec![-0.8, 0.6])]).unwrap();
        assert!((profile.threshold - THRESHOLD_FLOOR).abs() < 1e-6);
    }

    #[test]
    fn test_tight_cluster_keeps_high_threshold() {
        let profile = build_profile(&[
            unit(vec![0.9, 0.1, 0.0]),
            unit(vec![0.85, 0.15, 0.0]),
            unit(vec![0.8, 0.2, 0.0]),
        ])
        .unwrap();
        assert!(profile.threshold > 0.9);
        assert!(profile.threshold <= 1.0);
    }

    #[test]
    fn test_degenerate_cancellation() {
        let profile =
            build_profile(&[unit(vec![1.0, 0.0]), unit(vec![-1.0, 0.0])]).unwrap();
        // Mean is exactly zero: centroid stays the zero vector and the
        // threshold floors out.
        assert_eq!(profile.centroid, vec![0.0, 0.0]);
        assert!((profile.threshold - THRESHOLD_FLOOR).abs() < 1e-6);
        assert_eq!(profile.score(&[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_deterministic() {
        let embeddings = vec![
            unit(vec![0.7, 0.3, 0.1]),
            unit(vec![0.6, 0.4, 0.05]),
            unit(vec![0.65, 0.35, 0.2]),
        ];
        let a = build_profile(&embeddings).unwrap();
        let b = build_profile(&embeddings).unwrap();
        assert_eq!(a.threshold.to_bits(), b.threshold.to_bits());
        let a_bits: Vec<u32> = a.centroid.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u32> = b.centroid.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }
}
