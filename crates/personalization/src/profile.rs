//! # User Profile
//!
//! This module defines the learned per-user state.
//!
//! ## UserProfile
//!
//! Preference weights (clamped to [0, 1]), behavior-pattern statistics and
//! the learned interaction style.
//!
//! ## InteractionRecord
//!
//! One recorded turn with optional feedback and derived satisfaction.
//!
//! ## ProfileState
//!
//! Profile plus its bounded interaction history. History has ring-buffer
//! semantics: appending past capacity silently drops the oldest record, so
//! its length is monotonically bounded.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Learned response style for one user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum InteractionStyle {
    /// Long queries and frequent feedback: wants thorough answers.
    Detailed,
    /// Short queries and rare feedback: wants terse answers.
    Brief,
    /// In between.
    Balanced,
    /// Not enough signal yet.
    #[default]
    Neutral,
}

/// Learned preference weights and behavior patterns for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    /// Category preference weights in [0, 1]. Absent keys read as
    /// [`UserProfile::DEFAULT_PREFERENCE`].
    pub preferences: HashMap<String, f32>,
    /// Behavior statistics in [0, 1]: query_frequency, price_sensitivity,
    /// exploration.
    pub behavior_patterns: HashMap<String, f32>,
    pub interaction_style: InteractionStyle,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl UserProfile {
    /// Baseline weight for a preference that has never been updated.
    pub const DEFAULT_PREFERENCE: f32 = 0.5;

    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            preferences: HashMap::new(),
            behavior_patterns: HashMap::new(),
            interaction_style: InteractionStyle::Neutral,
            created_at: now,
            last_updated: now,
        }
    }

    /// Current weight for `key`, defaulting to the 0.5 baseline.
    pub fn preference(&self, key: &str) -> f32 {
        self.preferences
            .get(key)
            .copied()
            .unwrap_or(Self::DEFAULT_PREFERENCE)
    }

    /// Adds `delta` to the weight for `key`, clamping the result to [0, 1].
    pub fn adjust_preference(&mut self, key: &str, delta: f32) {
        let current = self.preference(key);
        self.preferences
            .insert(key.to_string(), (current + delta).clamp(0.0, 1.0));
        self.last_updated = Utc::now();
    }

    /// Behavior pattern value, defaulting to neutral 0.5.
    pub fn behavior(&self, key: &str) -> f32 {
        self.behavior_patterns.get(key).copied().unwrap_or(0.5)
    }
}

/// One recorded interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub intent: String,
    pub response: String,
    pub feedback: Option<String>,
    pub products_mentioned: Vec<String>,
    /// Heuristic satisfaction in [0, 1]; None when no feedback was given.
    pub satisfaction: Option<f32>,
}

/// A profile together with its bounded interaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileState {
    pub profile: UserProfile,
    /// Oldest first, newest last.
    pub history: VecDeque<InteractionRecord>,
}

impl ProfileState {
    pub fn new(user_id: &str) -> Self {
        Self {
            profile: UserProfile::new(user_id),
            history: VecDeque::new(),
        }
    }

    /// Appends a record, dropping the oldest when at `capacity`.
    pub fn push_record(&mut self, record: InteractionRecord, capacity: usize) {
        while self.history.len() >= capacity.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// The most recent `window` records, oldest first.
    pub fn recent(&self, window: usize) -> Vec<&InteractionRecord> {
        let skip = self.history.len().saturating_sub(window);
        self.history.iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(query: &str) -> InteractionRecord {
        InteractionRecord {
            timestamp: Utc::now(),
            query: query.to_string(),
            intent: "product_query".to_string(),
            response: "ok".to_string(),
            feedback: None,
            products_mentioned: Vec::new(),
            satisfaction: None,
        }
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let mut state = ProfileState::new("u1");
        for i in 0..50 {
            state.push_record(record(&format!("q{}", i)), 10);
            assert!(state.history.len() <= 10);
        }
        assert_eq!(state.history.len(), 10);
        // Ring semantics: oldest dropped, newest kept.
        assert_eq!(state.history.back().unwrap().query, "q49");
        assert_eq!(state.history.front().unwrap().query, "q40");
    }

    #[test]
    fn adjust_preference_clamps_to_unit_interval() {
        let mut profile = UserProfile::new("u1");
        for _ in 0..100 {
            profile.adjust_preference("水果", 0.1);
        }
        assert_eq!(profile.preference("水果"), 1.0);
        for _ in 0..100 {
            profile.adjust_preference("水果", -0.1);
        }
        assert_eq!(profile.preference("水果"), 0.0);
    }

    #[test]
    fn unknown_preference_reads_as_baseline() {
        let profile = UserProfile::new("u1");
        assert_eq!(profile.preference("水果"), UserProfile::DEFAULT_PREFERENCE);
    }

    #[test]
    fn recent_returns_tail_window() {
        let mut state = ProfileState::new("u1");
        for i in 0..8 {
            state.push_record(record(&format!("q{}", i)), 100);
        }
        let recent = state.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].query, "q5");
        assert_eq!(recent[2].query, "q7");
    }
}
