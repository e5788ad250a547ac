//! HTTP handlers for chat history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::chat::db::{latest_messages, save_message, ChatMessage};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::server::state::AppState;

/// Wire shape of a chat message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i64,
    pub room_id: i64,
    pub sender: String,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

impl From<ChatMessage> for MessageView {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            room_id: message.room_id,
            sender: message.sender_username,
            content: message.content,
            ts: message.created_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub size: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

/// `GET /api/rooms/{room_id}/messages?size=`
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(room_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let messages = latest_messages(&state.db, room_id, query.size).await?;
    Ok(Json(messages.into_iter().map(MessageView::from).collect()))
}

/// `POST /api/rooms/{room_id}/messages`
///
/// The sender is always the authenticated caller.
pub async fn post_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<i64>,
    Json(request): Json<PostMessageRequest>,
) -> Result<StatusCode, ApiError> {
    let message = save_message(
        &state.db,
        room_id,
        Some(user.user_id),
        &user.username,
        &request.content,
    )
    .await?;
    tracing::info!(
        id = message.id,
        room = room_id,
        sender = %message.sender_username,
        len = message.content.len(),
        "message saved"
    );
    Ok(StatusCode::ACCEPTED)
}
