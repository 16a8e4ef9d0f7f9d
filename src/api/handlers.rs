//! HTTP request handlers

use super::twiml;
use super::types::{
    ErrorResponse, RepairResponse, SessionListResponse, SessionMessagesResponse, SmsWebhookForm,
    StreakResponse, VoiceWebhookForm,
};
use super::AppState;
use crate::db::{Channel, Direction};
use crate::engine::current_streak;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Provider webhooks
        .route("/webhooks/sms", post(sms_webhook))
        .route("/webhooks/voice", post(voice_webhook))
        // Crisis entry point for the companion app
        .route("/api/users/:user_id/repair", post(start_repair))
        // Read model for the companion app
        .route("/api/users/:user_id/sessions", get(list_sessions))
        .route("/api/users/:user_id/streak", get(get_streak))
        .route("/api/sessions/:id/messages", get(session_messages))
        // Operational
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

/// Keyword that diverts a message into the crisis repair flow before the
/// regular state machine sees it
const REPAIR_KEYWORD: &str = "repair";

/// Page size for the session listing
const SESSION_PAGE_SIZE: u32 = 50;

// ============================================================
// Webhooks
// ============================================================

/// Handle an inbound SMS.
///
/// Always answers 200 with TwiML. The provider treats any other status as a
/// delivery failure and retries, and the user would see silence; persistence
/// problems are reported through the reply's outcomes and the logs instead.
async fn sms_webhook(State(state): State<AppState>, Form(form): Form<SmsWebhookForm>) -> Response {
    let user_id = form.from.clone();
    tracing::info!(user_id = %user_id, "Inbound SMS");

    state
        .engine
        .log_message(
            Direction::Inbound,
            &form.from,
            &form.to,
            &form.body,
            form.message_sid.as_deref(),
        )
        .await;

    let reply = if is_repair_request(&form.body) {
        state.engine.start_repair(&user_id, Channel::Sms).await
    } else {
        state
            .engine
            .process_input(&user_id, &form.body, Channel::Sms)
            .await
    };

    state
        .engine
        .log_message(Direction::Outbound, &form.to, &form.from, &reply.text, None)
        .await;

    xml_response(twiml::sms_reply(&reply.text))
}

/// Handle a voice webhook leg.
///
/// The first leg of a call has no input yet, which for a new caller lands on
/// the daily welcome; later legs carry gathered digits or speech.
async fn voice_webhook(
    State(state): State<AppState>,
    Form(form): Form<VoiceWebhookForm>,
) -> Response {
    let user_id = form.from.clone();
    let input = form.digits.or(form.speech_result).unwrap_or_default();
    tracing::info!(user_id = %user_id, "Inbound voice leg");

    state
        .engine
        .log_message(
            Direction::Inbound,
            &form.from,
            &form.to,
            &input,
            form.call_sid.as_deref(),
        )
        .await;

    let reply = if is_repair_request(&input) {
        state.engine.start_repair(&user_id, Channel::Ivr).await
    } else {
        state
            .engine
            .process_input(&user_id, &input, Channel::Ivr)
            .await
    };

    state
        .engine
        .log_message(Direction::Outbound, &form.to, &form.from, &reply.text, None)
        .await;

    xml_response(twiml::voice_reply(&reply.text))
}

fn is_repair_request(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(REPAIR_KEYWORD)
}

fn xml_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

// ============================================================
// Crisis Entry
// ============================================================

/// Start the repair flow for a user from the companion app's panic button.
/// The opening prompt comes back in the response so the app can show it
/// immediately; the conversation continues over SMS.
async fn start_repair(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<RepairResponse> {
    let reply = state.engine.start_repair(&user_id, Channel::Sms).await;
    Json(RepairResponse {
        user_id,
        reply: reply.text,
    })
}

// ============================================================
// Read Model
// ============================================================

async fn list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SessionListResponse>, AppError> {
    let sessions = state
        .db
        .list_sessions(&user_id, SESSION_PAGE_SIZE)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(SessionListResponse { sessions }))
}

async fn get_streak(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StreakResponse>, AppError> {
    let previous = state
        .db
        .last_daily_session(&user_id)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let streak_count = current_streak(previous.as_ref(), Utc::now().date_naive());
    Ok(Json(StreakResponse {
        user_id,
        streak_count,
    }))
}

async fn session_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionMessagesResponse>, AppError> {
    // Unknown session is a 404, not an empty transcript.
    state
        .db
        .get_session(&id)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let messages = state
        .db
        .messages_for_session(&id)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(SessionMessagesResponse { messages }))
}

// ============================================================
// Operational
// ============================================================

async fn health() -> &'static str {
    "ok"
}

async fn get_version() -> &'static str {
    concat!("next-moment ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
