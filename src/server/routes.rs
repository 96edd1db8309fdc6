//! HTTP route handlers for the chat relay.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{MethodFilter, on, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::core::ids::SessionId;
use crate::session::manager::ChatReply;
use crate::session::message::Message;

use super::page::INDEX_HTML;
use super::state::AppState;

/// Body returned when a chat request carries no usable text.
pub const MISSING_TEXT: &str = "missing 'text'";

/// Create the router with all routes. Unknown paths and methods answer 404.
///
/// `GET` routes are registered on the exact method so that `HEAD` is not
/// answered implicitly.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", on(MethodFilter::GET, index_page).fallback(not_found))
        .route("/chat", post(chat).fallback(not_found))
        .route("/history", on(MethodFilter::GET, history).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Target session; `"default"` when absent.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    /// User message.
    pub text: Option<String>,
}

/// Handle a chat turn. The body is parsed by hand so that malformed JSON is a
/// 400 with no side effects rather than an extractor rejection.
async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatReply>, Response> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        (StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}")).into_response()
    })?;

    let Some(text) = request.text.filter(|text| !text.is_empty()) else {
        return Err((StatusCode::BAD_REQUEST, MISSING_TEXT).into_response());
    };

    let session_id = SessionId::resolve(request.session_id);
    tracing::debug!(session = %session_id, chars = text.len(), "chat request");

    let reply = state
        .router
        .chat(session_id, text)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(reply))
}

/// First `sessionId` value of a query string. Repeated keys are not an error.
fn first_session_id(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "sessionId")
        .map(|(_, value)| value.into_owned())
}

/// Return a session's persisted transcript.
async fn history(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Message>>, Response> {
    let session_id = SessionId::resolve(first_session_id(query.as_deref()));
    let messages = state
        .router
        .history(session_id)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(messages))
}
