//! Dialogue phase state machine.
//!
//! The conversation phase advances on detected intent labels via a fixed
//! lookup table. Unmapped intents leave the state unchanged; there are no
//! rejecting transitions. `Completed` is only ever set explicitly by the
//! orchestrator.

use serde::{Deserialize, Serialize};

/// Phase of a retail product-query conversation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DialogueState {
    #[default]
    Initial,
    ProductInquiry,
    PriceInquiry,
    Recommendation,
    PolicyInquiry,
    AvailabilityCheck,
    Comparison,
    PurchaseIntent,
    Clarification,
    Completed,
}

impl DialogueState {
    /// Returns the state reached from `self` on the given intent label.
    ///
    /// Unknown intents self-loop. The table is total: every input is
    /// accepted.
    pub fn on_intent(self, intent: &str) -> DialogueState {
        match intent {
            "product_query" | "product_inquiry" => DialogueState::ProductInquiry,
            "price_query" | "price_inquiry" => DialogueState::PriceInquiry,
            "recommendation" => DialogueState::Recommendation,
            "policy_query" | "policy_question" => DialogueState::PolicyInquiry,
            "availability_check" | "stock_query" => DialogueState::AvailabilityCheck,
            "comparison" => DialogueState::Comparison,
            "purchase_intent" => DialogueState::PurchaseIntent,
            "clarification" => DialogueState::Clarification,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_then_price_query() {
        let state = DialogueState::Initial;
        let state = state.on_intent("recommendation");
        assert_eq!(state, DialogueState::Recommendation);
        let state = state.on_intent("price_query");
        assert_eq!(state, DialogueState::PriceInquiry);
    }

    #[test]
    fn unknown_intent_self_loops() {
        let state = DialogueState::Comparison;
        assert_eq!(state.on_intent("greeting"), DialogueState::Comparison);
        assert_eq!(state.on_intent(""), DialogueState::Comparison);
    }

    #[test]
    fn completed_is_never_entered_by_intent() {
        for intent in [
            "product_query",
            "price_query",
            "recommendation",
            "policy_query",
            "availability_check",
            "comparison",
            "purchase_intent",
            "clarification",
            "anything_else",
        ] {
            assert_ne!(DialogueState::Initial.on_intent(intent), DialogueState::Completed);
        }
    }
}
