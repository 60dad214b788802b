use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{ChatRoomId, EventId, UserId};
use crate::domains::users::UserSummary;

/// Chat room. Event rooms are created with their event; general rooms by users.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: ChatRoomId,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String, // 'EVENT', 'GENERAL'
    pub event_id: Option<EventId>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    Event,
    General,
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomType::Event => write!(f, "EVENT"),
            RoomType::General => write!(f, "GENERAL"),
        }
    }
}

impl std::str::FromStr for RoomType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EVENT" => Ok(RoomType::Event),
            "GENERAL" => Ok(RoomType::General),
            _ => Err(anyhow::anyhow!("Invalid room type: {}", s)),
        }
    }
}

impl ChatRoom {
    pub async fn find_by_id<'e>(id: ChatRoomId, db: impl PgExecutor<'e>) -> Result<Option<Self>> {
        let room = sqlx::query_as::<_, ChatRoom>("SELECT * FROM chat_rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(room)
    }

    pub async fn find_by_event<'e>(
        event_id: EventId,
        db: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let room = sqlx::query_as::<_, ChatRoom>("SELECT * FROM chat_rooms WHERE event_id = $1")
            .bind(event_id)
            .fetch_optional(db)
            .await?;
        Ok(room)
    }

    pub async fn create<'e>(
        name: &str,
        room_type: RoomType,
        event_id: Option<EventId>,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let room = sqlx::query_as::<_, ChatRoom>(
            r#"
            INSERT INTO chat_rooms (id, name, room_type, event_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ChatRoomId::new())
        .bind(name)
        .bind(room_type.to_string())
        .bind(event_id)
        .fetch_one(db)
        .await?;
        Ok(room)
    }

    /// Rooms with the most recent activity first.
    pub async fn list(room_type: Option<RoomType>, pool: &PgPool) -> Result<Vec<Self>> {
        let rooms = sqlx::query_as::<_, ChatRoom>(
            r#"
            SELECT * FROM chat_rooms
            WHERE $1::text IS NULL OR room_type = $1
            ORDER BY last_message_at DESC, created_at DESC
            "#,
        )
        .bind(room_type.map(|t| t.to_string()))
        .fetch_all(pool)
        .await?;
        Ok(rooms)
    }

    pub async fn rename(id: ChatRoomId, name: &str, pool: &PgPool) -> Result<Option<Self>> {
        let room = sqlx::query_as::<_, ChatRoom>(
            "UPDATE chat_rooms SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;
        Ok(room)
    }

    /// Delete a room; members and messages go with it.
    pub async fn delete(id: ChatRoomId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chat_rooms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_message<'e>(
        id: ChatRoomId,
        at: DateTime<Utc>,
        db: impl PgExecutor<'e>,
    ) -> Result<()> {
        sqlx::query("UPDATE chat_rooms SET last_message_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(db)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Membership (a set: adding twice is a no-op)
    // =========================================================================

    /// Returns `true` when the user was not a member before.
    pub async fn add_member<'e>(
        room_id: ChatRoomId,
        user_id: UserId,
        db: impl PgExecutor<'e>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_room_members (room_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (room_id, user_id) DO NOTHING
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_member(room_id: ChatRoomId, user_id: UserId, pool: &PgPool) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM chat_room_members WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    pub async fn member_count(room_id: ChatRoomId, pool: &PgPool) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chat_room_members WHERE room_id = $1")
                .bind(room_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    pub async fn members(room_id: ChatRoomId, pool: &PgPool) -> Result<Vec<UserSummary>> {
        let members = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.user_id, u.username, u.profile_image
            FROM chat_room_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.room_id = $1
            ORDER BY m.joined_at
            "#,
        )
        .bind(room_id)
        .fetch_all(pool)
        .await?;
        Ok(members)
    }
}
