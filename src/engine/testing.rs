//! Mock implementations for testing
//!
//! These mocks enable engine testing without real I/O.

use super::traits::*;
use crate::db::{MessageRecord, NewMessage, NewSession, Session};
use crate::flow::Flow;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

// ============================================================================
// In-Memory Storage
// ============================================================================

/// In-memory storage for testing
#[allow(dead_code)]
pub struct InMemoryStorage {
    sessions: Mutex<Vec<Session>>,
    messages: Mutex<Vec<MessageRecord>>,
    next_id: Mutex<u64>,
}

#[allow(dead_code)]
impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        }
    }

    fn mint_id(&self, prefix: &str) -> String {
        let mut guard = self.next_id.lock().unwrap();
        let id = format!("{prefix}-{}", *guard);
        *guard += 1;
        id
    }

    /// Get all stored sessions in insertion order
    pub fn all_sessions(&self) -> Vec<Session> {
        self.sessions.lock().unwrap().clone()
    }

    /// Get all logged messages in insertion order
    pub fn all_messages(&self) -> Vec<MessageRecord> {
        self.messages.lock().unwrap().clone()
    }

    /// Insert a session as-is, bypassing id minting and timestamping.
    /// Lets tests plant history with explicit `created_at` values.
    pub fn seed_session(&self, session: Session) {
        self.sessions.lock().unwrap().push(session);
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemoryStorage {
    async fn insert_session(&self, new: &NewSession) -> Result<Session, String> {
        let session = Session {
            id: self.mint_id("session"),
            user_id: new.user_id.clone(),
            flow: new.flow,
            channel: new.channel,
            mood: new.mood,
            intention: new.intention.clone(),
            trigger: new.trigger.clone(),
            streak_count: new.streak_count,
            created_at: Utc::now(),
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn last_daily_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id && s.flow == Flow::Daily)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn link_messages(&self, user_id: &str, session_id: &str) -> Result<usize, String> {
        let mut messages = self.messages.lock().unwrap();
        let mut linked = 0;
        for msg in messages.iter_mut() {
            let belongs = msg.from_number == user_id || msg.to_number == user_id;
            if belongs && msg.session_id.is_none() {
                msg.session_id = Some(session_id.to_string());
                linked += 1;
            }
        }
        Ok(linked)
    }
}

#[async_trait]
impl MessageStore for InMemoryStorage {
    async fn append_message(&self, new: &NewMessage) -> Result<MessageRecord, String> {
        let record = MessageRecord {
            id: self.mint_id("msg"),
            direction: new.direction,
            from_number: new.from_number.clone(),
            to_number: new.to_number.clone(),
            body: new.body.clone(),
            provider_message_id: new.provider_message_id.clone(),
            session_id: None,
            created_at: Utc::now(),
        };
        self.messages.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

// ============================================================================
// Failing Storage
// ============================================================================

/// Storage where every operation fails, for availability-path testing
pub struct FailingStorage;

#[async_trait]
impl SessionStore for FailingStorage {
    async fn insert_session(&self, _new: &NewSession) -> Result<Session, String> {
        Err("storage offline".to_string())
    }

    async fn last_daily_session(&self, _user_id: &str) -> Result<Option<Session>, String> {
        Err("storage offline".to_string())
    }

    async fn link_messages(&self, _user_id: &str, _session_id: &str) -> Result<usize, String> {
        Err("storage offline".to_string())
    }
}

#[async_trait]
impl MessageStore for FailingStorage {
    async fn append_message(&self, _new: &NewMessage) -> Result<MessageRecord, String> {
        Err("storage offline".to_string())
    }
}

// ============================================================================
// Link-Failing Storage
// ============================================================================

/// Storage that persists sessions and messages but cannot backfill links.
/// Exercises the partial-failure path where a session saves and the
/// message linkage does not.
pub struct LinkFailingStorage {
    pub inner: InMemoryStorage,
}

#[allow(dead_code)]
impl LinkFailingStorage {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStorage::new(),
        }
    }
}

impl Default for LinkFailingStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for LinkFailingStorage {
    async fn insert_session(&self, new: &NewSession) -> Result<Session, String> {
        self.inner.insert_session(new).await
    }

    async fn last_daily_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        self.inner.last_daily_session(user_id).await
    }

    async fn link_messages(&self, _user_id: &str, _session_id: &str) -> Result<usize, String> {
        Err("update failed".to_string())
    }
}

#[async_trait]
impl MessageStore for LinkFailingStorage {
    async fn append_message(&self, new: &NewMessage) -> Result<MessageRecord, String> {
        self.inner.append_message(new).await
    }
}
