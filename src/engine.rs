//! Conversation engine
//!
//! Drives the pure flow state machine against injected storage. The engine
//! owns the order of operations for one inbound message: snapshot the user's
//! live state, run the transition, execute persistence effects, write the
//! new state back. Persistence is best-effort: a dead database changes the
//! `outcomes` on the reply, never the reply text and never the state machine.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::db::{Channel, Direction, NewMessage, NewSession, Session};
use crate::flow::{self, ConversationState, Effect, Flow, Mood, TransitionResult};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Type alias for the production engine with concrete storage
pub type ProductionEngine = ConversationEngine<DatabaseStorage>;

/// In-memory table of live conversation states, keyed by user id.
///
/// Constructed by the caller and handed to the engine, so tests and
/// diagnostics can observe state from outside. Entries live for the life of
/// the process: completing a flow resets a user's entry on their next
/// message rather than removing it. A restart forgets in-flight
/// conversations, which is acceptable; completed sessions are already
/// durable.
#[derive(Clone, Default)]
pub struct StateTable {
    inner: Arc<Mutex<HashMap<String, ConversationState>>>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the live state for a user
    pub fn get(&self, user_id: &str) -> Option<ConversationState> {
        self.inner.lock().unwrap().get(user_id).cloned()
    }

    fn put(&self, state: ConversationState) {
        self.inner
            .lock()
            .unwrap()
            .insert(state.user_id.clone(), state);
    }

    /// Number of users with live state
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

/// What happened to one best-effort persistence step.
///
/// Callers that must answer within a webhook deadline read the reply text
/// and ignore these; tests and logs read them to see exactly which writes
/// landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    SessionSaved {
        session_id: String,
        streak_count: u32,
    },
    SessionSaveFailed {
        error: String,
    },
    MessagesLinked {
        session_id: String,
        count: usize,
    },
    MessageLinkFailed {
        session_id: String,
        error: String,
    },
}

/// Reply produced for one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to send back to the user
    pub text: String,
    /// Persistence results for this turn, in execution order
    pub outcomes: Vec<PersistOutcome>,
}

/// Drives per-user conversation flows and persists completed sessions
pub struct ConversationEngine<S> {
    states: StateTable,
    storage: S,
}

impl<S: Storage> ConversationEngine<S> {
    pub fn new(states: StateTable, storage: S) -> Self {
        Self { states, storage }
    }

    /// Process one inbound message from a user.
    ///
    /// A user with no live conversation gets the daily check-in welcome, no
    /// matter what they sent. Webhook delivery serializes messages per user,
    /// so the snapshot taken here cannot be raced by another message from
    /// the same user.
    pub async fn process_input(&self, user_id: &str, input: &str, channel: Channel) -> Reply {
        let result = match self.states.get(user_id) {
            Some(state) => flow::transition(&state, input),
            None => flow::begin_daily(user_id),
        };
        self.apply(result, channel).await
    }

    /// Enter the crisis repair flow, replacing whatever conversation was
    /// live. Reaching out in a hard moment must never be blocked by a
    /// half-finished check-in.
    pub async fn start_repair(&self, user_id: &str, channel: Channel) -> Reply {
        let result = flow::begin_repair(user_id);
        self.apply(result, channel).await
    }

    /// Append one message to the durable log, unlinked to any session.
    ///
    /// Returns the stored row id, or `None` when the write failed. Failures
    /// are logged and swallowed: losing a log row must not cost the user a
    /// reply.
    pub async fn log_message(
        &self,
        direction: Direction,
        from_number: &str,
        to_number: &str,
        body: &str,
        provider_message_id: Option<&str>,
    ) -> Option<String> {
        let new = NewMessage {
            direction,
            from_number: from_number.to_string(),
            to_number: to_number.to_string(),
            body: body.to_string(),
            provider_message_id: provider_message_id.map(String::from),
        };
        match self.storage.append_message(&new).await {
            Ok(record) => Some(record.id),
            Err(e) => {
                tracing::error!(
                    direction = %direction,
                    from = %from_number,
                    to = %to_number,
                    error = %e,
                    "Failed to log message"
                );
                None
            }
        }
    }

    /// Execute a transition's effects, store the new state, build the reply
    async fn apply(&self, result: TransitionResult, channel: Channel) -> Reply {
        let TransitionResult {
            state,
            reply,
            effects,
        } = result;

        let mut outcomes = Vec::new();
        for effect in effects {
            match effect {
                Effect::SaveSession {
                    flow,
                    mood,
                    intention,
                    trigger,
                } => {
                    self.save_session(
                        &state.user_id,
                        flow,
                        mood,
                        intention,
                        trigger,
                        channel,
                        &mut outcomes,
                    )
                    .await;
                }
            }
        }

        self.states.put(state);
        Reply {
            text: reply,
            outcomes,
        }
    }

    #[allow(clippy::too_many_arguments)] // One call site, mirrors the effect payload
    async fn save_session(
        &self,
        user_id: &str,
        flow: Flow,
        mood: Option<Mood>,
        intention: Option<String>,
        trigger: Option<String>,
        channel: Channel,
        outcomes: &mut Vec<PersistOutcome>,
    ) {
        let streak_count = self.streak_for_save(user_id, flow).await;
        let new = NewSession {
            user_id: user_id.to_string(),
            flow,
            channel,
            mood,
            intention,
            trigger,
            streak_count,
        };

        let session = match self.storage.insert_session(&new).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to save session");
                outcomes.push(PersistOutcome::SessionSaveFailed { error: e });
                return;
            }
        };

        tracing::info!(
            user_id = %user_id,
            session_id = %session.id,
            flow = %session.flow,
            streak = session.streak_count,
            "Session saved"
        );
        outcomes.push(PersistOutcome::SessionSaved {
            session_id: session.id.clone(),
            streak_count: session.streak_count,
        });

        match self.storage.link_messages(user_id, &session.id).await {
            Ok(count) => {
                tracing::debug!(session_id = %session.id, count, "Linked messages to session");
                outcomes.push(PersistOutcome::MessagesLinked {
                    session_id: session.id,
                    count,
                });
            }
            Err(e) => {
                tracing::error!(session_id = %session.id, error = %e, "Failed to link messages");
                outcomes.push(PersistOutcome::MessageLinkFailed {
                    session_id: session.id,
                    error: e,
                });
            }
        }
    }

    /// Streak value to record on a session being saved right now.
    ///
    /// When the history lookup fails the session is still saved, with the
    /// streak a fresh start would get. Recording a conservative number beats
    /// dropping the session.
    async fn streak_for_save(&self, user_id: &str, flow: Flow) -> u32 {
        let previous = match self.storage.last_daily_session(user_id).await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to read streak history, treating as fresh start"
                );
                None
            }
        };
        next_streak(previous.as_ref(), Utc::now().date_naive(), flow)
    }
}

/// Streak recorded on a session completed on `today`, given the most recent
/// daily session on record.
///
/// Daily sessions extend the chain: a first completion starts at 1, a second
/// completion the same UTC day repeats the value, completing the day after
/// the previous session adds 1, and any longer gap starts over at 1. Repair
/// sessions snapshot the streak without extending it, and record 0 when the
/// chain is already broken.
fn next_streak(previous: Option<&Session>, today: NaiveDate, flow: Flow) -> u32 {
    match flow {
        Flow::Daily => match previous {
            None => 1,
            Some(prev) if prev.created_at.date_naive() == today => prev.streak_count,
            Some(prev) if Some(prev.created_at.date_naive()) == today.pred_opt() => {
                prev.streak_count + 1
            }
            Some(_) => 1,
        },
        Flow::Repair => current_streak(previous, today),
    }
}

/// Streak a user currently holds, for display.
///
/// The chain is alive if the most recent daily session was today or
/// yesterday; otherwise the streak has lapsed to 0.
pub fn current_streak(previous: Option<&Session>, today: NaiveDate) -> u32 {
    match previous {
        None => 0,
        Some(prev) => {
            let prev_day = prev.created_at.date_naive();
            if prev_day == today || Some(prev_day) == today.pred_opt() {
                prev.streak_count
            } else {
                0
            }
        }
    }
}
