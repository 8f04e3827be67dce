//! Deterministic hash-based embedding provider.
//!
//! Feature-hashes character bigrams and whitespace-separated tokens into a
//! fixed-dimension vector, then L2-normalizes. No network, no model: the
//! same text always yields the same vector, which makes it suitable for
//! tests and for degraded operation when no real provider is configured.
//! Semantically it only captures surface overlap, not meaning.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::EmbeddingProvider;

/// Embedding provider backed by feature hashing.
#[derive(Debug, Clone)]
pub struct HashedEmbedding {
    dimension: usize,
}

impl HashedEmbedding {
    /// Creates a provider emitting vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, feature: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let normalized = text.to_lowercase();

        for token in normalized.split_whitespace() {
            vector[self.bucket(token)] += 1.0;
        }
        let chars: Vec<char> = normalized.chars().filter(|c| !c.is_whitespace()).collect();
        for pair in chars.windows(2) {
            let bigram: String = pair.iter().collect();
            vector[self.bucket(&bigram)] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashedEmbedding {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbedding {
    async fn encode(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        Ok(self.embed_sync(text))
    }
}

/// Cosine similarity clamped to [0, 1]; zero-norm and empty vectors score 0.
pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}
