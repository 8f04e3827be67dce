//! Entity mention state tracked per user session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Kind of a recognized entity mention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Product,
    Category,
    Quality,
    Price,
    Quantity,
}

impl EntityKind {
    /// Stable lower-case label, used to key entity state per (kind, value).
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Category => "category",
            EntityKind::Quality => "quality",
            EntityKind::Price => "price",
            EntityKind::Quantity => "quantity",
        }
    }
}

/// Aggregated recency/frequency state for one recognized (kind, value) pair.
///
/// Created on first mention with confidence 0.8, updated on repeat mentions.
/// Never explicitly deleted; bounded by the lifetime of the owning session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityState {
    pub kind: EntityKind,
    pub value: String,
    /// Detection confidence in [0, 1].
    pub confidence: f32,
    pub last_mentioned: DateTime<Utc>,
    pub mention_count: u32,
    /// Nodes in which this entity was mentioned.
    pub source_nodes: Vec<NodeId>,
}

impl EntityState {
    /// Initial confidence assigned on first mention.
    pub const INITIAL_CONFIDENCE: f32 = 0.8;

    /// Creates the state for a first mention observed in `node_id`.
    pub fn first_mention(kind: EntityKind, value: String, node_id: NodeId) -> Self {
        Self {
            kind,
            value,
            confidence: Self::INITIAL_CONFIDENCE,
            last_mentioned: Utc::now(),
            mention_count: 1,
            source_nodes: vec![node_id],
        }
    }

    /// Records a repeat mention observed in `node_id`.
    pub fn record_mention(&mut self, node_id: NodeId) {
        self.mention_count = self.mention_count.saturating_add(1);
        self.last_mentioned = Utc::now();
        self.source_nodes.push(node_id);
    }
}
