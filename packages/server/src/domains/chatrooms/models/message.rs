use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{ChatMessageId, ChatRoomId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub room_id: ChatRoomId,
    pub sender_id: Option<UserId>, // null once the sender's account is gone
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Message joined with its sender's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    pub id: ChatMessageId,
    pub room_id: ChatRoomId,
    pub sender_id: Option<UserId>,
    pub sender_user_id: Option<String>,
    pub sender_username: Option<String>,
    pub sender_profile_image: Option<String>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub async fn find_by_id(id: ChatMessageId, pool: &PgPool) -> Result<Option<Self>> {
        let message = sqlx::query_as::<_, ChatMessage>("SELECT * FROM chat_messages WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(message)
    }

    pub async fn create<'e>(
        room_id: ChatRoomId,
        sender_id: Option<UserId>,
        content: &str,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, room_id, sender_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ChatMessageId::new())
        .bind(room_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(db)
        .await?;
        Ok(message)
    }

    /// Room history, oldest first.
    pub async fn find_by_room(room_id: ChatRoomId, pool: &PgPool) -> Result<Vec<ChatMessageView>> {
        let messages = sqlx::query_as::<_, ChatMessageView>(
            r#"
            SELECT
                m.id, m.room_id, m.sender_id,
                u.user_id AS sender_user_id,
                u.username AS sender_username,
                u.profile_image AS sender_profile_image,
                m.content, m.sent_at
            FROM chat_messages m
            LEFT JOIN users u ON u.id = m.sender_id
            WHERE m.room_id = $1
            ORDER BY m.sent_at, m.id
            "#,
        )
        .bind(room_id)
        .fetch_all(pool)
        .await?;
        Ok(messages)
    }

    pub async fn update_content(
        id: ChatMessageId,
        content: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let message = sqlx::query_as::<_, ChatMessage>(
            "UPDATE chat_messages SET content = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await?;
        Ok(message)
    }

    pub async fn delete(id: ChatMessageId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
