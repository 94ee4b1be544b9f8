//! Chat endpoints.
//!
//! - POST /api/v1/conversations/{id}/chat         - complete reply as JSON
//! - POST /api/v1/conversations/{id}/chat/stream  - reply as Server-Sent Events
//!
//! SSE event types:
//! - `fragment` -- incremental text: `{ "text": "..." }`
//! - `done` -- reply complete and persisted: `{}`
//! - `error` -- generation failed, nothing persisted: `{ "message": "..." }`

use std::convert::Infallible;
use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;
use uuid::Uuid;

use scholar_core::service::tutor::{ChatFragment, ChatReply};

use crate::http::error::AppError;
use crate::http::extractors::user::UserId;
use crate::http::handlers::conversation::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/v1/conversations/{id}/chat
pub async fn chat(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&conversation_id)?;
    let reply = state.tutor.chat(&user_id, &id, &body.message).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(reply, request_id, elapsed)
        .with_link("conversation", &format!("/api/v1/conversations/{id}"));

    Ok(Json(resp))
}

/// POST /api/v1/conversations/{id}/chat/stream
///
/// Request errors (unknown conversation, empty message) are returned as a
/// regular JSON error before any event is sent.
pub async fn stream_chat(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let id = parse_uuid(&conversation_id)?;

    let fragments = state
        .tutor
        .clone()
        .chat_stream(&user_id, &id, &body.message)
        .await?;

    let events = fragments.map(|fragment| Ok::<_, Infallible>(fragment_event(fragment)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn fragment_event(fragment: ChatFragment) -> Event {
    match fragment {
        ChatFragment::Text { text } => Event::default()
            .event("fragment")
            .data(serde_json::json!({ "text": text }).to_string()),
        ChatFragment::Done => Event::default().event("done").data("{}"),
        ChatFragment::Error { message } => Event::default()
            .event("error")
            .data(serde_json::json!({ "message": message }).to_string()),
    }
}
