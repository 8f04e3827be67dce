//! # Personalization Store
//!
//! Per-user profile and interaction-history store. Learning only starts
//! once a user has a minimum number of recorded interactions; before that
//! the store serves cold-start defaults.
//!
//! ## Thread Safety
//!
//! The profile index uses `Arc<RwLock<HashMap>>`; each user's state sits
//! behind its own `tokio::sync::Mutex`, so requests for different users
//! never contend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use context_core::{CategoryLexicon, EntityLexicon, SentimentLexicon, StyleNudges};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::PersonalizationConfig;
use crate::learning::{update_behavior_patterns, update_preferences, update_style};
use crate::profile::{InteractionRecord, InteractionStyle, ProfileState, UserProfile};
use crate::ranking::{personalized_score, AdaptiveStyle, Candidate};
use crate::satisfaction::satisfaction_score;

/// Candidates returned to users without enough history.
const COLD_START_LIMIT: usize = 3;
/// Candidates returned once personalization is active.
const RANK_LIMIT: usize = 5;

/// Word lists the store learns from. Injectable so tests can substitute
/// minimal tables.
#[derive(Debug, Clone)]
pub struct Lexicons {
    pub sentiment: SentimentLexicon,
    pub categories: CategoryLexicon,
    pub nudges: StyleNudges,
    /// Terms marking a query as price-related, for price sensitivity.
    pub price_terms: Vec<String>,
}

impl Default for Lexicons {
    fn default() -> Self {
        Self {
            sentiment: SentimentLexicon::default(),
            categories: CategoryLexicon::default(),
            nudges: StyleNudges::default(),
            price_terms: EntityLexicon::default().price_terms,
        }
    }
}

/// Serializable capture of one user's profile and history, the unit of
/// the abstract snapshot/restore contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub user_id: String,
    pub state: ProfileState,
}

/// Store of per-user learned profiles.
pub struct PersonalizationStore {
    profiles: RwLock<HashMap<String, Arc<Mutex<ProfileState>>>>,
    lexicons: Lexicons,
    config: Arc<dyn PersonalizationConfig>,
}

impl PersonalizationStore {
    pub fn new(config: Arc<dyn PersonalizationConfig>) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            lexicons: Lexicons::default(),
            config,
        }
    }

    /// Replaces the lexicons (e.g. with minimal test tables).
    pub fn with_lexicons(mut self, lexicons: Lexicons) -> Self {
        self.lexicons = lexicons;
        self
    }

    async fn state(&self, user_id: &str) -> Option<Arc<Mutex<ProfileState>>> {
        let profiles = self.profiles.read().await;
        profiles.get(user_id).map(Arc::clone)
    }

    async fn state_or_create(&self, user_id: &str) -> Arc<Mutex<ProfileState>> {
        {
            let profiles = self.profiles.read().await;
            if let Some(state) = profiles.get(user_id) {
                return Arc::clone(state);
            }
        }
        let mut profiles = self.profiles.write().await;
        let state = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!(user_id = %user_id, "creating profile");
                Arc::new(Mutex::new(ProfileState::new(user_id)))
            });
        Arc::clone(state)
    }

    /// Records one interaction and, once the user has enough history,
    /// runs the incremental learning updates.
    pub async fn record_interaction(
        &self,
        user_id: &str,
        query: &str,
        intent: &str,
        response: &str,
        products_mentioned: &[String],
        feedback: Option<&str>,
    ) {
        let satisfaction =
            feedback.map(|f| satisfaction_score(&self.lexicons.sentiment, f));
        let record = InteractionRecord {
            timestamp: Utc::now(),
            query: query.to_string(),
            intent: intent.to_string(),
            response: response.to_string(),
            feedback: feedback.map(|f| f.to_string()),
            products_mentioned: products_mentioned.to_vec(),
            satisfaction,
        };

        let state = self.state_or_create(user_id).await;
        let mut state = state.lock().await;
        state.push_record(record, self.config.history_capacity());

        if state.history.len() < self.config.min_interactions() {
            debug!(
                user_id = %user_id,
                history_len = state.history.len(),
                min = self.config.min_interactions(),
                "below learning threshold, skipping update"
            );
            return;
        }

        let learning_rate = self.config.learning_rate();
        let behavior_window = self.config.behavior_window();
        let style_window = self.config.style_window();
        let ProfileState { profile, history } = &mut *state;

        if let Some(latest) = history.back() {
            update_preferences(
                profile,
                latest,
                &self.lexicons.categories,
                &self.lexicons.nudges,
                learning_rate,
            );
        }
        let behavior_recent: Vec<&InteractionRecord> = tail(history, behavior_window);
        update_behavior_patterns(profile, &behavior_recent, &self.lexicons.price_terms);
        let style_recent: Vec<&InteractionRecord> = tail(history, style_window);
        update_style(profile, &style_recent);
        profile.last_updated = Utc::now();

        info!(
            user_id = %user_id,
            satisfaction = ?satisfaction,
            history_len = history.len(),
            style = ?profile.interaction_style,
            "interaction recorded and profile updated"
        );
    }

    /// Ranks candidates for the user.
    ///
    /// Cold-start users (fewer than the minimum interactions) get the
    /// input order truncated to 3; learned users get the top 5 by
    /// personalized score.
    pub async fn rank(&self, user_id: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let profile = match self.state(user_id).await {
            Some(state) => {
                let state = state.lock().await;
                if state.history.len() < self.config.min_interactions() {
                    None
                } else {
                    Some(state.profile.clone())
                }
            }
            None => None,
        };

        match profile {
            None => {
                debug!(user_id = %user_id, "cold start, truncating candidates");
                candidates.into_iter().take(COLD_START_LIMIT).collect()
            }
            Some(profile) => {
                let mut scored: Vec<(f32, Candidate)> = candidates
                    .into_iter()
                    .map(|c| (personalized_score(&profile, &c), c))
                    .collect();
                scored.sort_by(|a, b| {
                    b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal)
                });
                scored.into_iter().take(RANK_LIMIT).map(|(_, c)| c).collect()
            }
        }
    }

    /// Response shaping hints for the user; unknown users are neutral.
    pub async fn adaptive_style(&self, user_id: &str) -> AdaptiveStyle {
        let style = match self.state(user_id).await {
            Some(state) => state.lock().await.profile.interaction_style,
            None => InteractionStyle::Neutral,
        };
        AdaptiveStyle::for_style(style)
    }

    /// Copy of the user's profile, if one exists.
    pub async fn profile(&self, user_id: &str) -> Option<UserProfile> {
        let state = self.state(user_id).await?;
        let state = state.lock().await;
        Some(state.profile.clone())
    }

    /// Number of users with a profile.
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Captures one user's profile and history for external persistence.
    pub async fn snapshot(&self, user_id: &str) -> Option<ProfileSnapshot> {
        let state = self.state(user_id).await?;
        let state = state.lock().await.clone();
        Some(ProfileSnapshot {
            user_id: user_id.to_string(),
            state,
        })
    }

    /// Restores a previously captured profile, replacing any current one.
    pub async fn restore(&self, snapshot: ProfileSnapshot) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(
            snapshot.user_id,
            Arc::new(Mutex::new(snapshot.state)),
        );
    }
}

fn tail<T>(history: &std::collections::VecDeque<T>, window: usize) -> Vec<&T> {
    let skip = history.len().saturating_sub(window);
    history.iter().skip(skip).collect()
}
