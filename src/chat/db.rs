//! Database operations for chat rooms and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// History defaults when the caller passes no size or an out-of-range one.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// A persisted chat message. The sender's handle is denormalized so history
/// stays readable if the account goes away.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: Option<i64>,
    pub sender_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Create the room row on first touch.
pub async fn ensure_room(pool: &SqlitePool, room_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO chat_rooms (id, name, created_at) VALUES (?1, ?2, ?3)")
        .bind(room_id)
        .bind(format!("Room {room_id}"))
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Persist a message in a room, creating the room if needed.
pub async fn save_message(
    pool: &SqlitePool,
    room_id: i64,
    sender_id: Option<i64>,
    sender_username: &str,
    content: &str,
) -> Result<ChatMessage, sqlx::Error> {
    ensure_room(pool, room_id).await?;
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO messages (room_id, sender_id, sender_username, content, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(room_id)
    .bind(sender_id)
    .bind(sender_username)
    .bind(content)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ChatMessage {
        id: result.last_insert_rowid(),
        room_id,
        sender_id,
        sender_username: sender_username.to_string(),
        content: content.to_string(),
        created_at: now,
    })
}

/// The most recent messages in a room, returned in ascending order for
/// display. `limit` is clamped to the defaults above.
pub async fn latest_messages(
    pool: &SqlitePool,
    room_id: i64,
    limit: Option<i64>,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let limit = match limit {
        Some(n) if n > 0 && n <= MAX_HISTORY_LIMIT => n,
        _ => DEFAULT_HISTORY_LIMIT,
    };

    let mut messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT id, room_id, sender_id, sender_username, content, created_at \
         FROM messages WHERE room_id = ?1 \
         ORDER BY created_at DESC, id DESC LIMIT ?2",
    )
    .bind(room_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    messages.reverse();
    Ok(messages)
}
