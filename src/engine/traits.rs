//! Trait abstractions for engine I/O
//!
//! These traits enable testing the engine with mock implementations.

use crate::db::{MessageRecord, NewMessage, NewSession, Session};
use async_trait::async_trait;

/// Storage for completed sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a completed flow as a session row
    async fn insert_session(&self, new: &NewSession) -> Result<Session, String>;

    /// Most recent daily session for a user, if any
    async fn last_daily_session(&self, user_id: &str) -> Result<Option<Session>, String>;

    /// Backfill session links onto the user's unlinked messages, returning
    /// the number of rows linked
    async fn link_messages(&self, user_id: &str, session_id: &str) -> Result<usize, String>;
}

/// Storage for the append-only message log
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message to the log, unlinked to any session
    async fn append_message(&self, new: &NewMessage) -> Result<MessageRecord, String>;
}

/// Combined storage trait for convenience
pub trait Storage: SessionStore + MessageStore {}
impl<T: SessionStore + MessageStore> Storage for T {}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn insert_session(&self, new: &NewSession) -> Result<Session, String> {
        (**self).insert_session(new).await
    }

    async fn last_daily_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        (**self).last_daily_session(user_id).await
    }

    async fn link_messages(&self, user_id: &str, session_id: &str) -> Result<usize, String> {
        (**self).link_messages(user_id, session_id).await
    }
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn append_message(&self, new: &NewMessage) -> Result<MessageRecord, String> {
        (**self).append_message(new).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

use crate::db::Database;
use std::sync::Arc;

/// Adapter to use Database as Storage
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DatabaseStorage {
    async fn insert_session(&self, new: &NewSession) -> Result<Session, String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.db.insert_session(&id, new).map_err(|e| e.to_string())
    }

    async fn last_daily_session(&self, user_id: &str) -> Result<Option<Session>, String> {
        self.db.last_daily_session(user_id).map_err(|e| e.to_string())
    }

    async fn link_messages(&self, user_id: &str, session_id: &str) -> Result<usize, String> {
        self.db
            .link_messages_to_session(user_id, session_id)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl MessageStore for DatabaseStorage {
    async fn append_message(&self, new: &NewMessage) -> Result<MessageRecord, String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.db.append_message(&id, new).map_err(|e| e.to_string())
    }
}
