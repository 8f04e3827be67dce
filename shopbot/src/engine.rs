//! Per-turn orchestration.

use std::sync::Arc;

use context_core::{
    DialogueState, EntityKind, EntityLexicon, NodeKind, SentimentLexicon, TurnMetadata,
};
use context_graph::{ContextGraph, SessionSummary};
use personalization::{AdaptiveStyle, Candidate, PersonalizationStore};
use tracing::{info, warn};

use crate::{IntentClassifier, ResponseGenerator};

/// Intent label used when the classifier is unavailable.
const UNKNOWN_INTENT: &str = "unknown";

/// Result of one handled turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: String,
    pub intent: String,
    pub dialogue_state: DialogueState,
    /// Prior context nodes that informed the reply.
    pub context_nodes_used: usize,
}

/// Orchestrates one conversation turn end to end.
///
/// Control flow per turn: classify the query, fetch relevant prior
/// context, generate a reply, write the query and response into the
/// context graph, and feed the interaction into the personalization
/// store for learning. Context and personalization are best-effort:
/// their degraded modes never abort a turn.
pub struct TurnEngine {
    classifier: Arc<dyn IntentClassifier>,
    responder: Arc<dyn ResponseGenerator>,
    graph: Arc<ContextGraph>,
    personalization: Arc<PersonalizationStore>,
    entity_lexicon: EntityLexicon,
    sentiment: SentimentLexicon,
    max_context_nodes: usize,
}

impl TurnEngine {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        responder: Arc<dyn ResponseGenerator>,
        graph: Arc<ContextGraph>,
        personalization: Arc<PersonalizationStore>,
    ) -> Self {
        Self {
            classifier,
            responder,
            graph,
            personalization,
            entity_lexicon: EntityLexicon::default(),
            sentiment: SentimentLexicon::default(),
            max_context_nodes: 5,
        }
    }

    /// Sets how many prior context nodes are retrieved per turn.
    pub fn with_max_context_nodes(mut self, max: usize) -> Self {
        self.max_context_nodes = max;
        self
    }

    /// Handles one user turn. `feedback` is the user's reaction to the
    /// previous reply, when the front end captured one.
    pub async fn handle_turn(
        &self,
        user_id: &str,
        text: &str,
        feedback: Option<&str>,
    ) -> Result<TurnOutcome, anyhow::Error> {
        let intent = match self.classifier.classify(text).await {
            Ok(label) => label,
            Err(e) => {
                warn!(error = %e, "intent classifier unavailable, using unknown intent");
                UNKNOWN_INTENT.to_string()
            }
        };

        let style = self.personalization.adaptive_style(user_id).await;
        let context = self
            .graph
            .relevant_context(user_id, text, self.max_context_nodes)
            .await;
        let response = self.responder.generate(text, &context, &style).await?;

        let positive_feedback = feedback
            .map(|f| {
                let (pos, neg) = self.sentiment.hit_counts(f);
                pos > neg
            })
            .unwrap_or(false);
        self.graph
            .add_node(
                user_id,
                text,
                NodeKind::Query,
                TurnMetadata {
                    positive_feedback,
                    source_intent: Some(intent.clone()),
                    ..TurnMetadata::default()
                },
                Some(&intent),
            )
            .await;
        self.graph
            .add_node(
                user_id,
                &response,
                NodeKind::Response,
                TurnMetadata::default(),
                None,
            )
            .await;

        let products = self.mentioned_products(text);
        self.personalization
            .record_interaction(user_id, text, &intent, &response, &products, feedback)
            .await;

        let summary = self.graph.summary(user_id).await;
        info!(
            user_id = %user_id,
            intent = %intent,
            dialogue_state = ?summary.dialogue_state,
            context_used = context.len(),
            "turn handled"
        );
        Ok(TurnOutcome {
            response,
            intent,
            dialogue_state: summary.dialogue_state,
            context_nodes_used: context.len(),
        })
    }

    /// Ranks product candidates for the user.
    pub async fn rank(&self, user_id: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
        self.personalization.rank(user_id, candidates).await
    }

    /// Response shaping hints for the user.
    pub async fn adaptive_style(&self, user_id: &str) -> AdaptiveStyle {
        self.personalization.adaptive_style(user_id).await
    }

    /// Session summary for the user.
    pub async fn summary(&self, user_id: &str) -> SessionSummary {
        self.graph.summary(user_id).await
    }

    /// Marks the user's conversation as completed. This is the only way
    /// the dialogue state reaches `Completed`.
    pub async fn mark_completed(&self, user_id: &str) {
        let session = self.graph.store().get_or_create(user_id).await;
        let mut session = session.lock().await;
        session.dialogue_state = DialogueState::Completed;
        session.touch();
    }

    fn mentioned_products(&self, text: &str) -> Vec<String> {
        self.entity_lexicon
            .scan(text)
            .into_iter()
            .filter(|(kind, _)| *kind == EntityKind::Product)
            .map(|(_, value)| value.to_string())
            .collect()
    }
}
