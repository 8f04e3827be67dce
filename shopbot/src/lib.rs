//! # Shopbot
//!
//! Thin orchestration layer over the context graph and personalization
//! store. Wires intent classification, context retrieval, response
//! generation and learning updates into one per-turn flow; everything
//! interesting lives in the `context-graph` and `personalization` crates.
//!
//! The HTTP/CLI front end, the product catalog and the actual language
//! models are external: they plug in through the [`IntentClassifier`] and
//! [`ResponseGenerator`] traits and the `EmbeddingProvider` trait from the
//! `embedding` crate.

use async_trait::async_trait;
use context_core::ContextNode;
use personalization::AdaptiveStyle;

mod engine;
mod logger;

pub use engine::{TurnEngine, TurnOutcome};
pub use logger::init_tracing;

/// Upstream intent classification capability.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifies a user query into an intent label (e.g. "price_query").
    async fn classify(&self, text: &str) -> Result<String, anyhow::Error>;
}

/// External response generation capability.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produces a reply for `query` given retrieved context and the
    /// user's adaptive style.
    async fn generate(
        &self,
        query: &str,
        context: &[ContextNode],
        style: &AdaptiveStyle,
    ) -> Result<String, anyhow::Error>;
}
