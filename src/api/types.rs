//! API request and response types

use crate::db::{MessageRecord, Session};
use serde::{Deserialize, Serialize};

/// Inbound SMS webhook payload, using the provider's form field names
#[derive(Debug, Deserialize)]
pub struct SmsWebhookForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
}

/// Inbound voice webhook payload.
///
/// The first leg of a call carries neither digits nor speech; later legs
/// carry whichever the gather captured.
#[derive(Debug, Deserialize)]
pub struct VoiceWebhookForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
}

/// A user's completed sessions, newest first
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
}

/// Messages linked to one session, oldest first
#[derive(Debug, Serialize)]
pub struct SessionMessagesResponse {
    pub messages: Vec<MessageRecord>,
}

/// A user's current daily streak
#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub user_id: String,
    pub streak_count: u32,
}

/// Response to starting the repair flow from the companion app
#[derive(Debug, Serialize)]
pub struct RepairResponse {
    pub user_id: String,
    pub reply: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
