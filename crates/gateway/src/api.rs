//! Chat and tool catalog endpoints.
//!
//! `POST /api/chat` answers with `application/x-ndjson`: one JSON event per
//! line, flushed as the agent produces it. Dropping the response body closes
//! the event channel, which aborts the in-flight request.

use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use cowork_core::message::{Role, Turn};
use cowork_core::provider::ToolDefinition;
use cowork_core::session::SessionContext;

use crate::SharedState;

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// A prior turn as the browser sends it: either `{role, text}` or the
/// model-native `{role, parts: [{text}]}`.
#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parts: Vec<HistoryPart>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl HistoryEntry {
    /// Entries with no text at all are dropped.
    pub fn into_turn(self) -> Option<Turn> {
        let text = match self.text {
            Some(text) => text,
            None => self
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join(""),
        };
        if text.trim().is_empty() {
            return None;
        }
        Some(match self.role {
            Role::User => Turn::user(text),
            Role::Agent => Turn::agent(text),
        })
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// The caller's Google access token from `Authorization: Bearer ...`.
fn session_from_headers(headers: &HeaderMap) -> Option<SessionContext> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(SessionContext::new(token))
    }
}

/// `POST /api/chat`
pub async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Some(session) = session_from_headers(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized: No active session");
    };

    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            debug!(error = %rejection, "Rejected chat body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let message = request.message.trim();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Message is required");
    }

    let history: Vec<Turn> = request
        .history
        .into_iter()
        .filter_map(HistoryEntry::into_turn)
        .collect();

    let rx = state.agent.spawn(message.to_string(), history, session);

    let lines = ReceiverStream::new(rx).filter_map(|event| match event.to_ndjson_line() {
        Ok(line) => Some(Ok::<_, Infallible>(line)),
        Err(e) => {
            warn!(error = %e, event = event.event_type(), "Dropping unserializable event");
            None
        }
    });

    (
        [
            (header::CONTENT_TYPE, "application/x-ndjson"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
        .into_response()
}

/// `GET /api/tools`
pub async fn tools_handler(State(state): State<SharedState>) -> Json<Vec<ToolDefinition>> {
    Json(state.agent.executor().definitions())
}
