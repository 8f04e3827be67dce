//! Incremental learning updates over the interaction history.
//!
//! Three updates run after each recorded interaction once the user has
//! enough history (see `PersonalizationStore`): preference weights from
//! the latest record, behavior patterns over a recent window, and
//! interaction style over a shorter window. All outputs are clamped to
//! [0, 1]; windows too small to be meaningful are skipped rather than
//! producing noise.

use context_core::{CategoryLexicon, StyleNudges};
use tracing::debug;

use crate::profile::{InteractionRecord, InteractionStyle, UserProfile};

/// Behavior-pattern keys.
pub const QUERY_FREQUENCY: &str = "query_frequency";
pub const PRICE_SENSITIVITY: &str = "price_sensitivity";
pub const EXPLORATION: &str = "exploration";

/// Satisfaction above this reinforces mentioned categories.
const SATISFACTION_HIGH: f32 = 0.6;
/// Satisfaction below this penalizes mentioned categories.
const SATISFACTION_LOW: f32 = 0.4;
/// Preference step, scaled by the learning rate.
const PREFERENCE_STEP: f32 = 0.1;
/// Intent-nudge step, scaled by the learning rate.
const NUDGE_STEP: f32 = 0.05;

/// One-hour reference for the query-frequency score.
const FREQUENCY_REFERENCE_SECS: f32 = 3600.0;
/// Minimum window for behavior-pattern updates.
const BEHAVIOR_MIN_WINDOW: usize = 5;

/// Average query length boundaries for style selection (chars).
const LONG_QUERY_CHARS: f32 = 20.0;
const SHORT_QUERY_CHARS: f32 = 10.0;
/// Feedback-rate boundaries for style selection.
const FREQUENT_FEEDBACK: f32 = 0.3;
const RARE_FEEDBACK: f32 = 0.1;

/// Applies the latest record to the profile's preference weights.
///
/// Mentioned products map to coarse categories; satisfaction above 0.6
/// reinforces them, below 0.4 penalizes them, and the middle band (or no
/// feedback, read as neutral 0.5) changes nothing. Some intents nudge a
/// style preference upward regardless of satisfaction.
pub fn update_preferences(
    profile: &mut UserProfile,
    record: &InteractionRecord,
    categories: &CategoryLexicon,
    nudges: &StyleNudges,
    learning_rate: f32,
) {
    let satisfaction = record.satisfaction.unwrap_or(0.5);
    for product in &record.products_mentioned {
        let Some(category) = categories.categorize(product) else {
            continue;
        };
        if satisfaction > SATISFACTION_HIGH {
            profile.adjust_preference(category, learning_rate * PREFERENCE_STEP);
        } else if satisfaction < SATISFACTION_LOW {
            profile.adjust_preference(category, -(learning_rate * PREFERENCE_STEP));
        }
    }
    if let Some(key) = nudges.preference_for(&record.intent) {
        profile.adjust_preference(key, learning_rate * NUDGE_STEP);
    }
}

/// Recomputes behavior patterns over the recent window (oldest first).
///
/// Skipped entirely when fewer than 5 records are available.
pub fn update_behavior_patterns(
    profile: &mut UserProfile,
    recent: &[&InteractionRecord],
    price_terms: &[String],
) {
    if recent.len() < BEHAVIOR_MIN_WINDOW {
        debug!(window = recent.len(), "behavior window too small, skipping");
        return;
    }

    let span = recent[recent.len() - 1].timestamp - recent[0].timestamp;
    let avg_interval_secs = span.num_seconds() as f32 / (recent.len() - 1) as f32;
    let frequency = (1.0 - avg_interval_secs / FREQUENCY_REFERENCE_SECS).clamp(0.0, 1.0);

    let price_queries = recent
        .iter()
        .filter(|r| {
            let query = r.query.to_lowercase();
            r.intent.contains("price") || price_terms.iter().any(|t| query.contains(t.as_str()))
        })
        .count();
    let price_sensitivity = price_queries as f32 / recent.len() as f32;

    let mut distinct_products: Vec<&str> = recent
        .iter()
        .flat_map(|r| r.products_mentioned.iter().map(|p| p.as_str()))
        .collect();
    distinct_products.sort_unstable();
    distinct_products.dedup();
    let exploration = (distinct_products.len() as f32 / recent.len() as f32).min(1.0);

    profile
        .behavior_patterns
        .insert(QUERY_FREQUENCY.to_string(), frequency);
    profile
        .behavior_patterns
        .insert(PRICE_SENSITIVITY.to_string(), price_sensitivity);
    profile
        .behavior_patterns
        .insert(EXPLORATION.to_string(), exploration);
}

/// Selects the interaction style from the recent window.
///
/// Long queries with frequent feedback read as `Detailed`, short queries
/// with rare feedback as `Brief`, anything else as `Balanced`. An empty
/// window leaves the style untouched.
pub fn update_style(profile: &mut UserProfile, recent: &[&InteractionRecord]) {
    if recent.is_empty() {
        return;
    }
    let avg_query_chars = recent
        .iter()
        .map(|r| r.query.chars().count() as f32)
        .sum::<f32>()
        / recent.len() as f32;
    let feedback_rate = recent.iter().filter(|r| r.feedback.is_some()).count() as f32
        / recent.len() as f32;

    profile.interaction_style =
        if avg_query_chars > LONG_QUERY_CHARS && feedback_rate > FREQUENT_FEEDBACK {
            InteractionStyle::Detailed
        } else if avg_query_chars < SHORT_QUERY_CHARS && feedback_rate < RARE_FEEDBACK {
            InteractionStyle::Brief
        } else {
            InteractionStyle::Balanced
        };
}
