//! Embedding configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;

/// Embedding provider configuration interface.
pub trait EmbeddingConfig: Send + Sync {
    fn provider(&self) -> &str;
    /// Vector dimension for providers that are dimension-configurable
    /// (e.g. the hashed fallback provider).
    fn dimension(&self) -> usize;
    /// Budget for one encode call before the caller degrades to no-vector
    /// operation.
    fn timeout_ms(&self) -> u64;
}

/// Embedding config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvEmbeddingConfig {
    pub embedding_provider: String,
    pub embedding_dimension: usize,
    pub embedding_timeout_ms: u64,
}

impl EmbeddingConfig for EnvEmbeddingConfig {
    fn provider(&self) -> &str {
        &self.embedding_provider
    }
    fn dimension(&self) -> usize {
        self.embedding_dimension
    }
    fn timeout_ms(&self) -> u64 {
        self.embedding_timeout_ms
    }
}

impl EnvEmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let embedding_provider =
            env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "hashed".to_string());
        let embedding_dimension = env::var("EMBEDDING_DIMENSION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256);
        let embedding_timeout_ms = env::var("EMBEDDING_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1500);
        Ok(Self {
            embedding_provider,
            embedding_dimension,
            embedding_timeout_ms,
        })
    }

    /// Validate config (dimension must be nonzero).
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dimension == 0 {
            anyhow::bail!("EMBEDDING_DIMENSION must be greater than zero");
        }
        Ok(())
    }
}
