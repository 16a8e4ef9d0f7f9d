//! Database module for Next Moment
//!
//! Provides persistence for completed sessions and the message log.

mod schema;

pub use schema::*;

use crate::flow::{Flow, Mood};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

const SESSION_COLUMNS: &str =
    "id, user_id, flow, channel, mood, intention, repair_trigger, streak_count, created_at";

const MESSAGE_COLUMNS: &str =
    "id, direction, from_number, to_number, body, provider_message_id, session_id, created_at";

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Insert a completed session
    pub fn insert_session(&self, id: &str, new: &NewSession) -> DbResult<Session> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO sessions (id, user_id, flow, channel, mood, intention, repair_trigger, streak_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                new.user_id,
                new.flow.as_str(),
                new.channel.as_str(),
                new.mood.map(Mood::as_str),
                new.intention,
                new.trigger,
                new.streak_count,
                now.to_rfc3339(),
            ],
        )?;

        Ok(Session {
            id: id.to_string(),
            user_id: new.user_id.clone(),
            flow: new.flow,
            channel: new.channel,
            mood: new.mood,
            intention: new.intention.clone(),
            trigger: new.trigger.clone(),
            streak_count: new.streak_count,
            created_at: now,
        })
    }

    /// Get session by ID
    pub fn get_session(&self, id: &str) -> DbResult<Session> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
            params![id],
            parse_session_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::SessionNotFound(id.to_string()),
            other => DbError::Sqlite(other),
        })
    }

    /// Most recent completed daily session for a user, if any.
    ///
    /// Repair sessions are skipped: the streak is defined by daily check-ins
    /// only. RFC 3339 timestamps in UTC sort lexicographically, so ordering
    /// by the text column is chronological.
    pub fn last_daily_session(&self, user_id: &str) -> DbResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE user_id = ?1 AND flow = 'daily'
                 ORDER BY created_at DESC LIMIT 1"
            ),
            params![user_id],
            parse_session_row,
        );

        match result {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's sessions, newest first
    pub fn list_sessions(&self, user_id: &str, limit: u32) -> DbResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE user_id = ?1
             ORDER BY created_at DESC LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![user_id, limit], parse_session_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    // ==================== Message Operations ====================

    /// Append a message to the log, unlinked to any session
    pub fn append_message(&self, id: &str, new: &NewMessage) -> DbResult<MessageRecord> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO messages (id, direction, from_number, to_number, body, provider_message_id, session_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
            params![
                id,
                new.direction.as_str(),
                new.from_number,
                new.to_number,
                new.body,
                new.provider_message_id,
                now.to_rfc3339(),
            ],
        )?;

        Ok(MessageRecord {
            id: id.to_string(),
            direction: new.direction,
            from_number: new.from_number.clone(),
            to_number: new.to_number.clone(),
            body: new.body.clone(),
            provider_message_id: new.provider_message_id.clone(),
            session_id: None,
            created_at: now,
        })
    }

    /// Backfill session links onto a user's unlinked messages.
    ///
    /// Matches every message where the user's number appears on either side
    /// and no session has claimed it yet. Messages already linked to an
    /// earlier session are never touched. Returns the number of rows linked.
    pub fn link_messages_to_session(&self, user_id: &str, session_id: &str) -> DbResult<usize> {
        let conn = self.conn.lock().unwrap();
        let linked = conn.execute(
            "UPDATE messages SET session_id = ?1
             WHERE (from_number = ?2 OR to_number = ?2) AND session_id IS NULL",
            params![session_id, user_id],
        )?;
        Ok(linked)
    }

    /// Messages linked to a session, oldest first
    pub fn messages_for_session(&self, session_id: &str) -> DbResult<Vec<MessageRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE session_id = ?1
             ORDER BY created_at ASC"
        ))?;

        let rows = stmt.query_map(params![session_id], parse_message_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

/// Parse a session row from the database
fn parse_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        flow: parse_flow(&row.get::<_, String>(2)?),
        channel: parse_channel(&row.get::<_, String>(3)?),
        mood: row.get::<_, Option<String>>(4)?.and_then(|s| parse_mood(&s)),
        intention: row.get(5)?,
        trigger: row.get(6)?,
        streak_count: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

/// Parse a message row from the database
fn parse_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        direction: parse_direction(&row.get::<_, String>(1)?),
        from_number: row.get(2)?,
        to_number: row.get(3)?,
        body: row.get(4)?,
        provider_message_id: row.get(5)?,
        session_id: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn parse_flow(s: &str) -> Flow {
    match s {
        "repair" => Flow::Repair,
        _ => Flow::Daily,
    }
}

fn parse_channel(s: &str) -> Channel {
    match s {
        "ivr" => Channel::Ivr,
        _ => Channel::Sms,
    }
}

fn parse_direction(s: &str) -> Direction {
    match s {
        "outbound" => Direction::Outbound,
        _ => Direction::Inbound,
    }
}

fn parse_mood(s: &str) -> Option<Mood> {
    match s {
        "calm" => Some(Mood::Calm),
        "stressed" => Some(Mood::Stressed),
        "tempted" => Some(Mood::Tempted),
        "hopeful" => Some(Mood::Hopeful),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
