//! # Session Store
//!
//! Explicit store for per-user sessions behind a trait, so the in-memory
//! map used today can later be swapped for a shared external store without
//! touching call sites.
//!
//! Each user's session sits behind its own `Arc<Mutex<_>>`: concurrent
//! requests for different users touch disjoint locks, while requests for
//! the same user serialize on that user's mutex.
//!
//! ## Thread Safety
//!
//! The store index uses `Arc<RwLock<HashMap>>` for thread-safe concurrent
//! access; session bodies use per-key `tokio::sync::Mutex`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::session::Session;

/// Serializable capture of one user's session, the unit of the abstract
/// snapshot/restore contract. The wire format is whatever serde target the
/// caller picks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user_id: String,
    pub session: Session,
}

/// Store of per-user sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `user_id`, creating it lazily on first use.
    async fn get_or_create(&self, user_id: &str) -> Arc<Mutex<Session>>;

    /// Returns the session for `user_id` if one exists.
    async fn get(&self, user_id: &str) -> Option<Arc<Mutex<Session>>>;

    /// Updates the session's last-activity timestamp, if it exists.
    async fn touch(&self, user_id: &str);

    /// Removes sessions idle for longer than `max_idle`; returns how many
    /// were removed.
    async fn evict_idle(&self, max_idle: Duration) -> usize;

    /// Number of live sessions.
    async fn len(&self) -> usize;

    /// Captures one user's session for external persistence.
    async fn snapshot(&self, user_id: &str) -> Option<SessionSnapshot>;

    /// Restores a previously captured session, replacing any current one.
    async fn restore(&self, snapshot: SessionSnapshot);
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, user_id: &str) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(user_id) {
                return Arc::clone(session);
            }
        }
        let mut sessions = self.sessions.write().await;
        // Re-check under the write lock: another task may have created it.
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!(user_id = %user_id, "creating session");
                Arc::new(Mutex::new(Session::new()))
            });
        Arc::clone(session)
    }

    async fn get(&self, user_id: &str) -> Option<Arc<Mutex<Session>>> {
        let sessions = self.sessions.read().await;
        sessions.get(user_id).map(Arc::clone)
    }

    async fn touch(&self, user_id: &str) {
        if let Some(session) = self.get(user_id).await {
            session.lock().await.touch();
        }
    }

    async fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut idle = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (user_id, session) in sessions.iter() {
                if session.lock().await.last_activity < cutoff {
                    idle.push(user_id.clone());
                }
            }
        }
        if idle.is_empty() {
            return 0;
        }
        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for user_id in idle {
            // Re-check under the write lock; the session may have been
            // touched between the scan and now.
            let still_idle = match sessions.get(&user_id) {
                Some(session) => session.lock().await.last_activity < cutoff,
                None => false,
            };
            if still_idle {
                sessions.remove(&user_id);
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed = removed, "evicted idle sessions");
        }
        removed
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn snapshot(&self, user_id: &str) -> Option<SessionSnapshot> {
        let session = self.get(user_id).await?;
        let session = session.lock().await.clone();
        Some(SessionSnapshot {
            user_id: user_id.to_string(),
            session,
        })
    }

    async fn restore(&self, snapshot: SessionSnapshot) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            snapshot.user_id,
            Arc::new(Mutex::new(snapshot.session)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_created_lazily_and_shared() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.len().await, 0);

        let a = store.get_or_create("alice").await;
        let b = store.get_or_create("alice").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn different_users_get_distinct_sessions() {
        let store = InMemorySessionStore::new();
        let a = store.get_or_create("alice").await;
        let b = store.get_or_create("bob").await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn evict_idle_removes_stale_sessions() {
        let store = InMemorySessionStore::new();
        let session = store.get_or_create("alice").await;
        {
            let mut session = session.lock().await;
            session.last_activity = Utc::now() - Duration::hours(2);
        }
        store.get_or_create("bob").await;

        let removed = store.evict_idle(Duration::hours(1)).await;
        assert_eq!(removed, 1);
        assert!(store.get("alice").await.is_none());
        assert!(store.get("bob").await.is_some());
    }

    #[tokio::test]
    async fn snapshot_restore_round_trip() {
        let store = InMemorySessionStore::new();
        let session = store.get_or_create("alice").await;
        {
            let mut session = session.lock().await;
            session.record_intent("recommendation");
        }

        let snapshot = store.snapshot("alice").await.unwrap();
        let other = InMemorySessionStore::new();
        other.restore(snapshot).await;

        let restored = other.get("alice").await.unwrap();
        let restored = restored.lock().await;
        assert_eq!(restored.intent_history.len(), 1);
        assert_eq!(
            restored.dialogue_state,
            context_core::DialogueState::Recommendation
        );
    }

    #[tokio::test]
    async fn snapshot_of_unknown_user_is_none() {
        let store = InMemorySessionStore::new();
        assert!(store.snapshot("ghost").await.is_none());
    }
}
