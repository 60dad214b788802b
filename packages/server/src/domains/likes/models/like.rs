use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::common::{EventId, LikeId, UserId};
use crate::domains::users::UserSummary;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: LikeId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub async fn exists(event_id: EventId, user_id: UserId, pool: &PgPool) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Returns `false` when the pair was already liked.
    pub async fn create(event_id: EventId, user_id: UserId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO likes (id, event_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(LikeId::new())
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(event_id: EventId, user_id: UserId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_event(event_id: EventId, pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Users who liked the event, earliest first.
    pub async fn likers(event_id: EventId, pool: &PgPool) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.user_id, u.username, u.profile_image
            FROM likes l
            JOIN users u ON u.id = l.user_id
            WHERE l.event_id = $1
            ORDER BY l.created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(users)
    }
}
