//! # Text Embeddings
//!
//! This crate defines the embedding provider interface used for semantic
//! similarity between dialogue turns, plus a deterministic hash-based
//! provider for tests and offline/degraded operation.

use async_trait::async_trait;

mod config;
mod hashed;

pub use config::{EmbeddingConfig, EnvEmbeddingConfig};
pub use hashed::HashedEmbedding;

/// Provider of fixed-dimension text embeddings.
///
/// Implementations may call a remote model and can fail or time out; all
/// callers must treat failure as non-fatal and degrade gracefully.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn encode(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Similarity of two texts in [0, 1], computed over their embeddings.
    async fn similarity(&self, a: &str, b: &str) -> Result<f32, anyhow::Error> {
        let u = self.encode(a).await?;
        let v = self.encode(b).await?;
        Ok(hashed::cosine(&u, &v))
    }
}
