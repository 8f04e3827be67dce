//! # Core Types
//!
//! This module defines the node types stored in the per-user context graph.
//!
//! ## NodeKind
//!
//! Classifies what a context node records.
//!
//! ### Variants
//!
//! - `Query`: A user query turn
//! - `Response`: An assistant response turn
//! - `Entity`: A derived entity fact
//! - `Intent`: A detected intent
//! - `Emotion`: A detected emotional signal
//!
//! ## TurnMetadata
//!
//! Fixed-schema metadata attached to a context node.
//!
//! ## ContextNode
//!
//! One recorded dialogue turn or derived fact, with an importance score,
//! optional embedding and symmetric links to related nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Identifier of a node in a context graph.
pub type NodeId = Uuid;

/// Classifies what a context node records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Query,
    Response,
    Entity,
    Intent,
    Emotion,
}

impl NodeKind {
    /// Base importance weight for this kind of node.
    pub fn base_weight(self) -> f32 {
        match self {
            NodeKind::Query => 1.0,
            NodeKind::Response => 0.8,
            NodeKind::Entity => 1.2,
            NodeKind::Intent => 0.9,
            NodeKind::Emotion => 0.7,
        }
    }
}

/// Fixed-schema metadata attached to a context node.
///
/// Replaces a free-form string/any map with named optional fields so the
/// importance computation and summaries stay type-safe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TurnMetadata {
    /// The turn carried explicit positive feedback.
    pub positive_feedback: bool,
    /// The turn was a clarification of an earlier turn.
    pub clarification: bool,
    /// Detected emotional signal, if any (e.g. "pleased", "frustrated").
    pub emotion: Option<String>,
    /// Intent label that produced this node, if any.
    pub source_intent: Option<String>,
}

/// A single node in the per-user context graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextNode {
    /// Unique identifier
    pub id: NodeId,
    /// The recorded content
    pub content: String,
    /// When the node was created
    pub timestamp: DateTime<Utc>,
    /// What this node records
    pub kind: NodeKind,
    /// Associated metadata
    pub metadata: TurnMetadata,
    /// Importance score (>= 0)
    pub importance: f32,
    /// Vector embedding for semantic linking, when available
    pub embedding: Option<Vec<f32>>,
    /// Ids of semantically linked nodes. Links are symmetric.
    pub links: HashSet<NodeId>,
}

impl ContextNode {
    /// Creates a new `ContextNode` with a generated id, no embedding and no links.
    pub fn new(content: String, kind: NodeKind, metadata: TurnMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            timestamp: Utc::now(),
            kind,
            metadata,
            importance: kind.base_weight(),
            embedding: None,
            links: HashSet::new(),
        }
    }
}
