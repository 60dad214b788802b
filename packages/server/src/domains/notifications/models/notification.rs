use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::common::NotificationId;
use crate::domains::notifications::NotificationMessage;

/// Outbox row for one email.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: String,
    pub recipient: String,
    pub payload: serde_json::Value,
    pub status: String, // 'pending', 'sent', 'failed'
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn message(&self) -> Result<NotificationMessage> {
        serde_json::from_value(self.payload.clone())
            .with_context(|| format!("Malformed payload for notification {}", self.id))
    }

    /// Queue an email for delivery.
    pub async fn enqueue<'e>(
        recipient: &str,
        message: &NotificationMessage,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let payload = serde_json::to_value(message)?;
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, kind, recipient, payload)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(NotificationId::new())
        .bind(message.kind())
        .bind(recipient)
        .bind(payload)
        .fetch_one(db)
        .await?;
        Ok(notification)
    }

    /// Claim up to `limit` untouched pending rows.
    ///
    /// Claiming bumps `attempts`, so a row is handed out at most once even
    /// with several dispatchers polling the same table.
    pub async fn claim_pending(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET attempts = attempts + 1
            WHERE id IN (
                SELECT id FROM notifications
                WHERE status = 'pending' AND attempts = 0
                ORDER BY created_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(notifications)
    }

    pub async fn mark_sent(id: NotificationId, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE notifications SET status = 'sent', sent_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn mark_failed(id: NotificationId, error: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE notifications SET status = 'failed', last_error = $2 WHERE id = $1")
            .bind(id)
            .bind(error)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Everything queued for an address, oldest first.
    pub async fn find_by_recipient(recipient: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient = $1 ORDER BY created_at",
        )
        .bind(recipient)
        .fetch_all(pool)
        .await?;
        Ok(notifications)
    }
}
