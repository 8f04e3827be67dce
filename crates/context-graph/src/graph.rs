//! # Context Graph Operations
//!
//! The [`ContextGraph`] service records dialogue turns as nodes in the
//! per-user session graph, links semantically similar recent turns,
//! retrieves relevant prior context for a query and produces session
//! summaries.
//!
//! ## Importance
//!
//! A node's importance combines a kind-based base weight, a content-length
//! factor capped at 1.5 (length / 50), an entity-density factor
//! (1 + 0.1 x lexicon matches) and metadata bonuses (+0.3 positive
//! feedback, +0.2 clarification). Importance is always >= 0 and is the
//! primary eviction key.
//!
//! ## Eviction
//!
//! After every `add_node`: nodes older than the context window are
//! dropped, then, if the session still exceeds the node cap, nodes are
//! kept by `(importance, timestamp)` descending. Priority eviction, not
//! LRU: a highly important old node can outlive a recent unimportant one.
//! Ties are deterministic, the older node loses.
//!
//! ## Degraded mode
//!
//! The embedding provider is optional and failable. Encode failures and
//! timeouts are non-fatal: nodes are stored without a vector and context
//! retrieval falls back to most-recent-first ordering.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use context_core::{
    cosine_similarity, ContextNode, DialogueState, NodeId, NodeKind, TurnMetadata,
};
use embedding::EmbeddingProvider;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::GraphConfig;
use crate::entity_tracker::EntityTracker;
use crate::session::Session;
use crate::store::SessionStore;

/// Relevance scoring weights: 0.7 similarity, 0.3 importance.
const SIMILARITY_WEIGHT: f32 = 0.7;
const IMPORTANCE_WEIGHT: f32 = 0.3;

/// Reference content length for the importance length factor.
const LENGTH_FACTOR_REFERENCE: f32 = 50.0;
const LENGTH_FACTOR_CAP: f32 = 1.5;

/// Snapshot of a session's conversational state for the orchestrator.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub dialogue_state: DialogueState,
    pub node_count: usize,
    /// Entities mentioned within the active window (default 30 minutes).
    pub active_entity_count: usize,
    /// Last 3 intents, newest first.
    pub recent_intents: Vec<String>,
    /// Top 5 entities by mention count: (value, mention_count).
    pub top_entities: Vec<(String, u32)>,
    pub session_duration_secs: i64,
    /// Most recently detected emotion, or "neutral".
    pub emotional_state: String,
}

impl Default for SessionSummary {
    fn default() -> Self {
        Self {
            dialogue_state: DialogueState::Initial,
            node_count: 0,
            active_entity_count: 0,
            recent_intents: Vec::new(),
            top_entities: Vec::new(),
            session_duration_secs: 0,
            emotional_state: "neutral".to_string(),
        }
    }
}

/// Per-user bounded context graph service.
pub struct ContextGraph {
    store: Arc<dyn SessionStore>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    entity_tracker: EntityTracker,
    config: Arc<dyn GraphConfig>,
}

impl ContextGraph {
    /// Creates a graph with no embedding provider (pure recency mode) and
    /// the default entity lexicon.
    pub fn new(store: Arc<dyn SessionStore>, config: Arc<dyn GraphConfig>) -> Self {
        Self {
            store,
            provider: None,
            entity_tracker: EntityTracker::default(),
            config,
        }
    }

    /// Sets the embedding provider used for semantic linking and retrieval.
    pub fn with_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replaces the entity tracker (e.g. with a test lexicon).
    pub fn with_entity_tracker(mut self, tracker: EntityTracker) -> Self {
        self.entity_tracker = tracker;
        self
    }

    /// The session store backing this graph.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Records a new turn as a context node and returns its id.
    ///
    /// Embeds the content when a provider is available (failure and
    /// timeout are non-fatal), computes importance, links the node to
    /// similar recent nodes, updates entity state, advances the dialogue
    /// phase when `intent` is supplied, then evicts expired and excess
    /// nodes.
    pub async fn add_node(
        &self,
        user_id: &str,
        content: &str,
        kind: NodeKind,
        metadata: TurnMetadata,
        intent: Option<&str>,
    ) -> NodeId {
        let embedding = self.encode(content).await;

        let session = self.store.get_or_create(user_id).await;
        let mut session = session.lock().await;

        let entity_matches = self.entity_tracker.lexicon().match_count(content);
        let mut node = ContextNode::new(content.to_string(), kind, metadata);
        node.embedding = embedding;
        node.importance = Self::importance(&node, entity_matches);

        let node_id = node.id;
        let linked = Self::link_similar(
            &mut session,
            &mut node,
            self.config.link_window_minutes(),
            self.config.link_similarity_threshold(),
        );
        session.nodes.insert(node_id, node);

        self.entity_tracker.record(&mut session, content, node_id);
        if let Some(intent) = intent {
            session.record_intent(intent);
        }
        session.touch();

        let (expired, excess) = Self::evict(
            &mut session,
            Utc::now(),
            self.config.context_window_minutes(),
            self.config.max_context_nodes(),
        );
        info!(
            user_id = %user_id,
            kind = ?kind,
            linked = linked,
            expired = expired,
            excess = excess,
            node_count = session.nodes.len(),
            "added context node"
        );

        node_id
    }

    /// Returns the most relevant prior nodes for `query`, at most
    /// `max_nodes`, best first.
    ///
    /// With a query embedding, nodes are scored
    /// `0.7 x cosine + 0.3 x importance` and ties break toward the more
    /// recent node. Without one (no provider, failure, timeout), falls
    /// back to most-recent-first. An unknown user yields an empty list.
    pub async fn relevant_context(
        &self,
        user_id: &str,
        query: &str,
        max_nodes: usize,
    ) -> Vec<ContextNode> {
        let session = match self.store.get(user_id).await {
            Some(session) => session,
            None => {
                debug!(user_id = %user_id, "no session, returning empty context");
                return Vec::new();
            }
        };
        let query_embedding = self.encode(query).await;
        let session = session.lock().await;
        if session.nodes.is_empty() {
            return Vec::new();
        }
        let mut nodes: Vec<ContextNode> = session.nodes.values().cloned().collect();
        drop(session);

        match query_embedding {
            Some(query_embedding) => {
                let mut scored: Vec<(f32, ContextNode)> = nodes
                    .into_iter()
                    .map(|node| {
                        let similarity = node
                            .embedding
                            .as_deref()
                            .map(|e| cosine_similarity(&query_embedding, e))
                            .unwrap_or(0.0);
                        let score =
                            SIMILARITY_WEIGHT * similarity + IMPORTANCE_WEIGHT * node.importance;
                        (score, node)
                    })
                    .collect();
                scored.sort_by(|a, b| {
                    b.0.partial_cmp(&a.0)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| b.1.timestamp.cmp(&a.1.timestamp))
                });
                scored.into_iter().take(max_nodes).map(|(_, n)| n).collect()
            }
            None => {
                debug!(user_id = %user_id, "no query embedding, falling back to recency");
                nodes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                nodes.truncate(max_nodes);
                nodes
            }
        }
    }

    /// Summarizes the user's session. Unknown users get the neutral
    /// default summary.
    pub async fn summary(&self, user_id: &str) -> SessionSummary {
        let session = match self.store.get(user_id).await {
            Some(session) => session,
            None => return SessionSummary::default(),
        };
        let session = session.lock().await;

        let active_cutoff =
            Utc::now() - Duration::minutes(self.config.active_entity_window_minutes());
        let active_entity_count = session
            .entities
            .values()
            .filter(|e| e.last_mentioned >= active_cutoff)
            .count();

        let mut top_entities: Vec<(String, u32)> = session
            .entities
            .values()
            .map(|e| (e.value.clone(), e.mention_count))
            .collect();
        top_entities.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_entities.truncate(5);

        SessionSummary {
            dialogue_state: session.dialogue_state,
            node_count: session.nodes.len(),
            active_entity_count,
            recent_intents: session.recent_intents(3),
            top_entities,
            session_duration_secs: session.duration().num_seconds(),
            emotional_state: Self::emotional_state(&session),
        }
    }

    async fn encode(&self, text: &str) -> Option<Vec<f32>> {
        let provider = self.provider.as_ref()?;
        let budget = StdDuration::from_millis(self.config.embedding_timeout_ms());
        match timeout(budget, provider.encode(text)).await {
            Ok(Ok(vector)) => Some(vector),
            Ok(Err(e)) => {
                warn!(error = %e, "embedding failed, continuing without vector");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.embedding_timeout_ms(),
                    "embedding timed out, continuing without vector"
                );
                None
            }
        }
    }

    fn importance(node: &ContextNode, entity_matches: usize) -> f32 {
        let base = node.kind.base_weight();
        let length_factor =
            (node.content.chars().count() as f32 / LENGTH_FACTOR_REFERENCE).min(LENGTH_FACTOR_CAP);
        let entity_factor = 1.0 + 0.1 * entity_matches as f32;
        let mut importance = base * length_factor * entity_factor;
        if node.metadata.positive_feedback {
            importance += 0.3;
        }
        if node.metadata.clarification {
            importance += 0.2;
        }
        importance.max(0.0)
    }

    /// Links `node` to every session node created within the link window
    /// whose cosine similarity exceeds the threshold. Links are symmetric.
    fn link_similar(
        session: &mut Session,
        node: &mut ContextNode,
        window_minutes: i64,
        threshold: f32,
    ) -> usize {
        let embedding = match node.embedding.as_deref() {
            Some(e) => e,
            None => return 0,
        };
        let cutoff = node.timestamp - Duration::minutes(window_minutes);
        let similar: Vec<NodeId> = session
            .nodes
            .values()
            .filter(|other| other.timestamp >= cutoff)
            .filter(|other| {
                other
                    .embedding
                    .as_deref()
                    .map(|e| cosine_similarity(embedding, e) > threshold)
                    .unwrap_or(false)
            })
            .map(|other| other.id)
            .collect();

        for other_id in &similar {
            node.links.insert(*other_id);
            if let Some(other) = session.nodes.get_mut(other_id) {
                other.links.insert(node.id);
            }
        }
        similar.len()
    }

    /// Drops expired nodes, then enforces the node cap by keeping the top
    /// `max_nodes` by `(importance, timestamp)` descending. Returns
    /// (expired, excess) counts. Removed ids are also pruned from link
    /// sets to keep links symmetric.
    fn evict(
        session: &mut Session,
        now: DateTime<Utc>,
        window_minutes: i64,
        max_nodes: usize,
    ) -> (usize, usize) {
        let cutoff = now - Duration::minutes(window_minutes);
        let expired: Vec<NodeId> = session
            .nodes
            .values()
            .filter(|n| n.timestamp < cutoff)
            .map(|n| n.id)
            .collect();
        let expired_count = expired.len();
        Self::remove_nodes(session, &expired);

        let excess_count = if session.nodes.len() > max_nodes {
            let mut ranked: Vec<(NodeId, f32, DateTime<Utc>)> = session
                .nodes
                .values()
                .map(|n| (n.id, n.importance, n.timestamp))
                .collect();
            ranked.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.2.cmp(&a.2))
            });
            let dropped: Vec<NodeId> = ranked[max_nodes..].iter().map(|(id, _, _)| *id).collect();
            Self::remove_nodes(session, &dropped);
            dropped.len()
        } else {
            0
        };

        (expired_count, excess_count)
    }

    fn remove_nodes(session: &mut Session, ids: &[NodeId]) {
        if ids.is_empty() {
            return;
        }
        let removed: HashSet<NodeId> = ids.iter().copied().collect();
        for id in ids {
            session.nodes.remove(id);
        }
        for node in session.nodes.values_mut() {
            node.links.retain(|id| !removed.contains(id));
        }
    }

    fn emotional_state(session: &Session) -> String {
        session
            .nodes
            .values()
            .filter(|n| n.kind == NodeKind::Emotion || n.metadata.emotion.is_some())
            .max_by_key(|n| n.timestamp)
            .map(|n| {
                n.metadata
                    .emotion
                    .clone()
                    .unwrap_or_else(|| n.content.clone())
            })
            .unwrap_or_else(|| "neutral".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvGraphConfig;
    use crate::store::InMemorySessionStore;
    use embedding::HashedEmbedding;

    fn graph_with(config: EnvGraphConfig) -> ContextGraph {
        ContextGraph::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(config),
        )
    }

    fn semantic_graph(config: EnvGraphConfig) -> ContextGraph {
        graph_with(config).with_provider(Arc::new(HashedEmbedding::new(128)))
    }

    #[tokio::test]
    async fn add_node_without_provider_stores_no_vector() {
        let graph = graph_with(EnvGraphConfig::default());
        let id = graph
            .add_node("u1", "do you have apples", NodeKind::Query, TurnMetadata::default(), None)
            .await;

        let session = graph.store().get("u1").await.unwrap();
        let session = session.lock().await;
        let node = session.nodes.get(&id).unwrap();
        assert!(node.embedding.is_none());
        assert!(node.importance >= 0.0);
    }

    #[tokio::test]
    async fn relevant_context_on_empty_session_is_empty() {
        let graph = semantic_graph(EnvGraphConfig::default());
        let context = graph.relevant_context("nobody", "apples", 5).await;
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn relevant_context_falls_back_to_recency_without_provider() {
        let graph = graph_with(EnvGraphConfig::default());
        graph
            .add_node("u1", "first", NodeKind::Query, TurnMetadata::default(), None)
            .await;
        graph
            .add_node("u1", "second", NodeKind::Response, TurnMetadata::default(), None)
            .await;
        let third = graph
            .add_node("u1", "third", NodeKind::Query, TurnMetadata::default(), None)
            .await;

        let context = graph.relevant_context("u1", "anything", 2).await;
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].id, third);
    }

    #[tokio::test]
    async fn relevant_context_prefers_similar_nodes() {
        let graph = semantic_graph(EnvGraphConfig::default());
        graph
            .add_node(
                "u1",
                "what is your return policy",
                NodeKind::Query,
                TurnMetadata::default(),
                None,
            )
            .await;
        let apples = graph
            .add_node(
                "u1",
                "how much are fresh apples",
                NodeKind::Query,
                TurnMetadata::default(),
                None,
            )
            .await;

        let context = graph
            .relevant_context("u1", "how much are fresh apples", 1)
            .await;
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].id, apples);
    }

    #[tokio::test]
    async fn similar_recent_nodes_are_linked_symmetrically() {
        let graph = semantic_graph(EnvGraphConfig::default());
        let a = graph
            .add_node("u1", "fresh apples today", NodeKind::Query, TurnMetadata::default(), None)
            .await;
        let b = graph
            .add_node("u1", "fresh apples today", NodeKind::Query, TurnMetadata::default(), None)
            .await;

        let session = graph.store().get("u1").await.unwrap();
        let session = session.lock().await;
        assert!(session.nodes.get(&b).unwrap().links.contains(&a));
        assert!(session.nodes.get(&a).unwrap().links.contains(&b));
    }

    #[tokio::test]
    async fn node_count_never_exceeds_configured_maximum() {
        let config = EnvGraphConfig {
            max_context_nodes: 3,
            ..EnvGraphConfig::default()
        };
        let graph = graph_with(config);
        for i in 0..10 {
            graph
                .add_node(
                    "u1",
                    &format!("turn number {}", i),
                    NodeKind::Query,
                    TurnMetadata::default(),
                    None,
                )
                .await;
            let session = graph.store().get("u1").await.unwrap();
            let session = session.lock().await;
            assert!(session.nodes.len() <= 3);
        }
    }

    #[tokio::test]
    async fn expired_nodes_are_evicted_on_next_add() {
        let graph = graph_with(EnvGraphConfig::default());
        let old = graph
            .add_node("u1", "stale turn", NodeKind::Query, TurnMetadata::default(), None)
            .await;
        {
            let session = graph.store().get("u1").await.unwrap();
            let mut session = session.lock().await;
            session.nodes.get_mut(&old).unwrap().timestamp = Utc::now() - Duration::minutes(90);
        }

        let fresh = graph
            .add_node("u1", "fresh turn", NodeKind::Query, TurnMetadata::default(), None)
            .await;

        let session = graph.store().get("u1").await.unwrap();
        let session = session.lock().await;
        assert!(!session.nodes.contains_key(&old));
        assert!(session.nodes.contains_key(&fresh));
    }

    #[tokio::test]
    async fn eviction_is_by_priority_not_recency() {
        // An important old node must outlive newer low-importance nodes.
        let config = EnvGraphConfig {
            max_context_nodes: 2,
            ..EnvGraphConfig::default()
        };
        let graph = graph_with(config);
        let important = graph
            .add_node(
                "u1",
                "customer said this answer was perfect and wants the same next week",
                NodeKind::Query,
                TurnMetadata {
                    positive_feedback: true,
                    ..TurnMetadata::default()
                },
                None,
            )
            .await;
        {
            // Backdate it within the window, but older than everything else.
            let session = graph.store().get("u1").await.unwrap();
            let mut session = session.lock().await;
            session.nodes.get_mut(&important).unwrap().timestamp =
                Utc::now() - Duration::minutes(30);
        }
        graph
            .add_node("u1", "ok", NodeKind::Response, TurnMetadata::default(), None)
            .await;
        graph
            .add_node("u1", "hm", NodeKind::Response, TurnMetadata::default(), None)
            .await;

        let session = graph.store().get("u1").await.unwrap();
        let session = session.lock().await;
        assert_eq!(session.nodes.len(), 2);
        assert!(session.nodes.contains_key(&important));
    }

    #[tokio::test]
    async fn capacity_eviction_breaks_ties_against_older_nodes() {
        let mut session = Session::new();
        let now = Utc::now();
        let mut make = |age_minutes: i64| {
            let mut node = ContextNode::new(
                "same".to_string(),
                NodeKind::Query,
                TurnMetadata::default(),
            );
            node.importance = 1.0;
            node.timestamp = now - Duration::minutes(age_minutes);
            let id = node.id;
            session.nodes.insert(id, node);
            id
        };
        let oldest = make(10);
        let middle = make(5);
        let newest = make(1);

        ContextGraph::evict(&mut session, now, 60, 2);

        assert!(!session.nodes.contains_key(&oldest));
        assert!(session.nodes.contains_key(&middle));
        assert!(session.nodes.contains_key(&newest));
    }

    #[tokio::test]
    async fn eviction_prunes_dangling_links() {
        let graph = semantic_graph(EnvGraphConfig {
            max_context_nodes: 1,
            ..EnvGraphConfig::default()
        });
        graph
            .add_node("u1", "red apples", NodeKind::Query, TurnMetadata::default(), None)
            .await;
        graph
            .add_node("u1", "red apples", NodeKind::Query, TurnMetadata::default(), None)
            .await;

        let session = graph.store().get("u1").await.unwrap();
        let session = session.lock().await;
        assert_eq!(session.nodes.len(), 1);
        for node in session.nodes.values() {
            assert!(node.links.is_empty());
        }
    }

    #[tokio::test]
    async fn intent_advances_dialogue_state_through_add_node() {
        let graph = graph_with(EnvGraphConfig::default());
        graph
            .add_node(
                "u1",
                "recommend fruit",
                NodeKind::Query,
                TurnMetadata::default(),
                Some("recommendation"),
            )
            .await;
        graph
            .add_node(
                "u1",
                "how much is the apple",
                NodeKind::Query,
                TurnMetadata::default(),
                Some("price_query"),
            )
            .await;

        let summary = graph.summary("u1").await;
        assert_eq!(summary.dialogue_state, DialogueState::PriceInquiry);
        assert_eq!(
            summary.recent_intents,
            vec!["price_query".to_string(), "recommendation".to_string()]
        );
    }

    #[tokio::test]
    async fn summary_reports_entities_and_emotion() {
        let graph = graph_with(EnvGraphConfig::default());
        graph
            .add_node("u1", "apple apple", NodeKind::Query, TurnMetadata::default(), None)
            .await;
        graph
            .add_node("u1", "apple and milk", NodeKind::Query, TurnMetadata::default(), None)
            .await;
        graph
            .add_node(
                "u1",
                "customer sounds pleased",
                NodeKind::Emotion,
                TurnMetadata {
                    emotion: Some("pleased".to_string()),
                    ..TurnMetadata::default()
                },
                None,
            )
            .await;

        let summary = graph.summary("u1").await;
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.emotional_state, "pleased");
        assert!(summary.active_entity_count >= 2);
        let top = &summary.top_entities[0];
        assert_eq!(top.0, "apple");
        assert_eq!(top.1, 2);
    }

    #[tokio::test]
    async fn summary_for_unknown_user_is_neutral() {
        let graph = graph_with(EnvGraphConfig::default());
        let summary = graph.summary("ghost").await;
        assert_eq!(summary.dialogue_state, DialogueState::Initial);
        assert_eq!(summary.node_count, 0);
        assert_eq!(summary.emotional_state, "neutral");
    }

    #[tokio::test]
    async fn positive_feedback_raises_importance() {
        let plain = ContextNode::new("same content here".to_string(), NodeKind::Query, TurnMetadata::default());
        let praised = ContextNode::new(
            "same content here".to_string(),
            NodeKind::Query,
            TurnMetadata {
                positive_feedback: true,
                ..TurnMetadata::default()
            },
        );
        let base = ContextGraph::importance(&plain, 0);
        let boosted = ContextGraph::importance(&praised, 0);
        assert!((boosted - base - 0.3).abs() < 1e-6);
    }
}
