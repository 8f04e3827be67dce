//! Entity mention tracking over session state.

use context_core::{EntityLexicon, EntityState, NodeId};
use tracing::debug;

use crate::session::Session;

/// Scans turn content against the entity lexicon and folds matches into
/// the session's entity states.
#[derive(Debug, Clone, Default)]
pub struct EntityTracker {
    lexicon: EntityLexicon,
}

impl EntityTracker {
    pub fn new(lexicon: EntityLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &EntityLexicon {
        &self.lexicon
    }

    /// Records every lexicon match in `content` against `session`,
    /// attributing them to `node_id`. Returns the number of matches.
    pub fn record(&self, session: &mut Session, content: &str, node_id: NodeId) -> usize {
        let matches = self.lexicon.scan(content);
        for (kind, value) in &matches {
            let key = format!("{}:{}", kind.label(), value);
            session
                .entities
                .entry(key)
                .and_modify(|state| state.record_mention(node_id))
                .or_insert_with(|| {
                    EntityState::first_mention(*kind, value.to_string(), node_id)
                });
        }
        if !matches.is_empty() {
            debug!(match_count = matches.len(), "recorded entity mentions");
        }
        matches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_core::EntityKind;
    use uuid::Uuid;

    fn minimal_lexicon() -> EntityLexicon {
        EntityLexicon {
            products: vec!["apple".to_string(), "milk".to_string()],
            categories: vec![],
            qualities: vec!["fresh".to_string()],
            price_terms: vec!["price".to_string()],
            quantity_terms: vec![],
        }
    }

    #[test]
    fn first_mention_creates_entity_state() {
        let tracker = EntityTracker::new(minimal_lexicon());
        let mut session = Session::new();

        let count = tracker.record(&mut session, "what is the price of a fresh apple", Uuid::new_v4());
        assert_eq!(count, 3);
        let apple = session.entities.get("product:apple").unwrap();
        assert_eq!(apple.kind, EntityKind::Product);
        assert_eq!(apple.mention_count, 1);
        assert_eq!(apple.confidence, EntityState::INITIAL_CONFIDENCE);
    }

    #[test]
    fn repeat_mentions_increment_count() {
        let tracker = EntityTracker::new(minimal_lexicon());
        let mut session = Session::new();

        tracker.record(&mut session, "apple please", Uuid::new_v4());
        tracker.record(&mut session, "one more APPLE", Uuid::new_v4());

        let apple = session.entities.get("product:apple").unwrap();
        assert_eq!(apple.mention_count, 2);
        assert_eq!(apple.source_nodes.len(), 2);
    }

    #[test]
    fn unmatched_content_records_nothing() {
        let tracker = EntityTracker::new(minimal_lexicon());
        let mut session = Session::new();

        let count = tracker.record(&mut session, "hello there", Uuid::new_v4());
        assert_eq!(count, 0);
        assert!(session.entities.is_empty());
    }
}
