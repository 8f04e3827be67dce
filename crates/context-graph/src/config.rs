//! Context graph configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;

/// Context graph tuning interface.
pub trait GraphConfig: Send + Sync {
    /// Nodes older than this window are evicted (minutes).
    fn context_window_minutes(&self) -> i64;
    /// Hard cap on nodes per session after eviction.
    fn max_context_nodes(&self) -> usize;
    /// Only nodes created within this window are candidates for semantic links (minutes).
    fn link_window_minutes(&self) -> i64;
    /// Minimum cosine similarity for a semantic link.
    fn link_similarity_threshold(&self) -> f32;
    /// Budget for one embedding call before the turn proceeds without a vector.
    fn embedding_timeout_ms(&self) -> u64;
    /// Entities mentioned within this window count as active in summaries (minutes).
    fn active_entity_window_minutes(&self) -> i64;
}

/// Graph config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvGraphConfig {
    pub context_window_minutes: i64,
    pub max_context_nodes: usize,
    pub link_window_minutes: i64,
    pub link_similarity_threshold: f32,
    pub embedding_timeout_ms: u64,
    pub active_entity_window_minutes: i64,
}

impl GraphConfig for EnvGraphConfig {
    fn context_window_minutes(&self) -> i64 {
        self.context_window_minutes
    }
    fn max_context_nodes(&self) -> usize {
        self.max_context_nodes
    }
    fn link_window_minutes(&self) -> i64 {
        self.link_window_minutes
    }
    fn link_similarity_threshold(&self) -> f32 {
        self.link_similarity_threshold
    }
    fn embedding_timeout_ms(&self) -> u64 {
        self.embedding_timeout_ms
    }
    fn active_entity_window_minutes(&self) -> i64 {
        self.active_entity_window_minutes
    }
}

impl Default for EnvGraphConfig {
    fn default() -> Self {
        Self {
            context_window_minutes: 60,
            max_context_nodes: 100,
            link_window_minutes: 5,
            link_similarity_threshold: 0.7,
            embedding_timeout_ms: 1500,
            active_entity_window_minutes: 30,
        }
    }
}

impl EnvGraphConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let context_window_minutes = env::var("SHOPBOT_CONTEXT_WINDOW_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.context_window_minutes);
        let max_context_nodes = env::var("SHOPBOT_MAX_CONTEXT_NODES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_context_nodes);
        let link_window_minutes = env::var("SHOPBOT_LINK_WINDOW_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.link_window_minutes);
        let link_similarity_threshold = env::var("SHOPBOT_LINK_SIMILARITY_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.link_similarity_threshold);
        let embedding_timeout_ms = env::var("SHOPBOT_EMBEDDING_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.embedding_timeout_ms);
        let active_entity_window_minutes = env::var("SHOPBOT_ACTIVE_ENTITY_WINDOW_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.active_entity_window_minutes);
        Ok(Self {
            context_window_minutes,
            max_context_nodes,
            link_window_minutes,
            link_similarity_threshold,
            embedding_timeout_ms,
            active_entity_window_minutes,
        })
    }
}
