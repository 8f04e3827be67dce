//! Per-user session state.
//!
//! A session owns the user's context graph nodes, entity states, dialogue
//! phase and a short intent history. Sessions are created lazily on first
//! interaction and live behind a [`crate::SessionStore`].

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use context_core::{ContextNode, DialogueState, EntityState, NodeId};
use serde::{Deserialize, Serialize};

/// One detected intent and when it was observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRecord {
    pub intent: String,
    pub at: DateTime<Utc>,
}

/// Per-user conversational state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub started_at: DateTime<Utc>,
    pub dialogue_state: DialogueState,
    /// Context graph nodes, keyed by node id. Node links are symmetric.
    pub nodes: HashMap<NodeId, ContextNode>,
    /// Entity states keyed by "kind:value".
    pub entities: HashMap<String, EntityState>,
    /// Most recent intents, newest last. Capped at [`Session::INTENT_HISTORY_CAP`].
    pub intent_history: VecDeque<IntentRecord>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Maximum number of intents retained per session.
    pub const INTENT_HISTORY_CAP: usize = 10;

    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            dialogue_state: DialogueState::Initial,
            nodes: HashMap::new(),
            entities: HashMap::new(),
            intent_history: VecDeque::new(),
            last_activity: now,
        }
    }

    /// Updates the last-activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Advances the dialogue phase on `intent` and appends it to the
    /// bounded intent history. Unknown intents leave the phase unchanged
    /// but are still recorded.
    pub fn record_intent(&mut self, intent: &str) {
        self.dialogue_state = self.dialogue_state.on_intent(intent);
        if self.intent_history.len() >= Self::INTENT_HISTORY_CAP {
            self.intent_history.pop_front();
        }
        self.intent_history.push_back(IntentRecord {
            intent: intent.to_string(),
            at: Utc::now(),
        });
    }

    /// The most recent `n` intent labels, newest first.
    pub fn recent_intents(&self, n: usize) -> Vec<String> {
        self.intent_history
            .iter()
            .rev()
            .take(n)
            .map(|r| r.intent.clone())
            .collect()
    }

    /// Time elapsed since the session started.
    pub fn duration(&self) -> Duration {
        Utc::now() - self.started_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_history_is_capped() {
        let mut session = Session::new();
        for i in 0..25 {
            session.record_intent(&format!("intent_{}", i));
        }
        assert_eq!(session.intent_history.len(), Session::INTENT_HISTORY_CAP);
        // Oldest entries were dropped, newest kept.
        assert_eq!(session.intent_history.back().unwrap().intent, "intent_24");
        assert_eq!(session.intent_history.front().unwrap().intent, "intent_15");
    }

    #[test]
    fn record_intent_advances_dialogue_state() {
        let mut session = Session::new();
        session.record_intent("recommendation");
        assert_eq!(session.dialogue_state, DialogueState::Recommendation);
        session.record_intent("price_query");
        assert_eq!(session.dialogue_state, DialogueState::PriceInquiry);
    }

    #[test]
    fn recent_intents_newest_first() {
        let mut session = Session::new();
        session.record_intent("a");
        session.record_intent("b");
        session.record_intent("c");
        assert_eq!(session.recent_intents(2), vec!["c".to_string(), "b".to_string()]);
    }
}
