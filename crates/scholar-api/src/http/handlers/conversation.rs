//! Conversation CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/conversations       - Create a conversation
//! - GET    /api/v1/conversations       - List the caller's conversations
//! - GET    /api/v1/conversations/{id}  - Conversation with its turns
//! - DELETE /api/v1/conversations/{id}  - Delete a conversation

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scholar_core::service::tutor::ConversationDetail;
use scholar_types::conversation::{ConversationSummary, Mode, SubMode};

use crate::http::error::AppError;
use crate::http::extractors::user::UserId;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub mode: String,
    #[serde(default)]
    pub sub_mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedConversation {
    pub id: Uuid,
    pub title: String,
    pub mode: Mode,
    pub sub_mode: Option<SubMode>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// POST /api/v1/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(body): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedConversation>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let conversation = state
        .tutor
        .create_conversation(user_id, &body.mode, body.sub_mode.as_deref())
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let self_link = format!("/api/v1/conversations/{}", conversation.id);
    let created = CreatedConversation {
        id: conversation.id,
        title: conversation.title,
        mode: conversation.mode,
        sub_mode: conversation.sub_mode,
    };

    let resp = ApiResponse::success(created, request_id, elapsed)
        .with_link("self", &self_link)
        .with_link("chat", &format!("{self_link}/chat"));

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<ApiResponse<Vec<ConversationSummary>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let conversations = state.tutor.list_conversations(&user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(conversations, request_id, elapsed)
        .with_link("self", "/api/v1/conversations");

    Ok(Json(resp))
}

/// GET /api/v1/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<ConversationDetail>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&conversation_id)?;
    let detail = state.tutor.get_conversation(&user_id, &id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(detail, request_id, elapsed)
        .with_link("self", &format!("/api/v1/conversations/{id}"));

    Ok(Json(resp))
}

/// DELETE /api/v1/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&conversation_id)?;
    state.tutor.delete_conversation(&user_id, &id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({"deleted": true, "id": id}),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}
