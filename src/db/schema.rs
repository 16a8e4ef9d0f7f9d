//! Database schema and row types

use crate::flow::{Flow, Mood};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    flow TEXT NOT NULL,
    channel TEXT NOT NULL,
    mood TEXT,
    intention TEXT,
    repair_trigger TEXT,
    streak_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_created ON sessions(user_id, created_at DESC);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    direction TEXT NOT NULL,
    from_number TEXT NOT NULL,
    to_number TEXT NOT NULL,
    body TEXT NOT NULL,
    provider_message_id TEXT,
    session_id TEXT REFERENCES sessions(id),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_from_number ON messages(from_number);
CREATE INDEX IF NOT EXISTS idx_messages_to_number ON messages(to_number);
CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id);
"#;

/// Channel a conversation happened over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Sms,
    Ivr,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Ivr => "ivr",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a logged message, from the service's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable record of one completed conversation flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub flow: Flow,
    pub channel: Channel,
    pub mood: Option<Mood>,
    pub intention: Option<String>,
    pub trigger: Option<String>,
    pub streak_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a session row. The id is minted by the caller and
/// `created_at` is stamped by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user_id: String,
    pub flow: Flow,
    pub channel: Channel,
    pub mood: Option<Mood>,
    pub intention: Option<String>,
    pub trigger: Option<String>,
    pub streak_count: u32,
}

/// One row of the append-only message log.
///
/// `session_id` starts NULL and is backfilled when the conversation the
/// message belongs to completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: String,
    pub direction: Direction,
    pub from_number: String,
    pub to_number: String,
    pub body: String,
    pub provider_message_id: Option<String>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a message row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub direction: Direction,
    pub from_number: String,
    pub to_number: String,
    pub body: String,
    pub provider_message_id: Option<String>,
}
