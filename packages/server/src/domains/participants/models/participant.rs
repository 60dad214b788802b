use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{EventId, ParticipantId, UserId};
use crate::domains::users::UserSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParticipantStatus {
    Pending,
    Approved,
    Rejected,
}

impl ParticipantStatus {
    /// Approved and Rejected are decisions; Pending is waiting for one.
    pub fn is_decided(&self) -> bool {
        !matches!(self, ParticipantStatus::Pending)
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantStatus::Pending => write!(f, "Pending"),
            ParticipantStatus::Approved => write!(f, "Approved"),
            ParticipantStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl std::str::FromStr for ParticipantStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(ParticipantStatus::Pending),
            "Approved" => Ok(ParticipantStatus::Approved),
            "Rejected" => Ok(ParticipantStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid participant status: {}", s)),
        }
    }
}

/// A user's participation in an event. One row per (event, user).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: String, // 'Pending', 'Approved', 'Rejected'
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Participation joined with the participant's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantWithUser {
    pub participant_id: ParticipantId,
    pub status: String,
    pub answer: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub user: UserSummary,
}

/// Where to send mail about an event's participants.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantContact {
    pub email: String,
    pub username: String,
}

impl Participant {
    pub fn parsed_status(&self) -> Result<ParticipantStatus> {
        self.status.parse()
    }

    pub async fn find_by_id<'e>(
        id: ParticipantId,
        db: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let participant =
            sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = $1")
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(participant)
    }

    pub async fn find<'e>(
        event_id: EventId,
        user_id: UserId,
        db: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT * FROM participants WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(participant)
    }

    /// Insert a participation. A second row for the same pair violates the
    /// unique constraint.
    pub async fn create<'e>(
        event_id: EventId,
        user_id: UserId,
        status: ParticipantStatus,
        answer: Option<&str>,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (id, event_id, user_id, status, answer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ParticipantId::new())
        .bind(event_id)
        .bind(user_id)
        .bind(status.to_string())
        .bind(answer)
        .fetch_one(db)
        .await?;
        Ok(participant)
    }

    pub async fn set_status<'e>(
        id: ParticipantId,
        status: ParticipantStatus,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_one(db)
        .await?;
        Ok(participant)
    }

    pub async fn delete(event_id: EventId, user_id: UserId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM participants WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_approved(event_id: EventId, pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM participants WHERE event_id = $1 AND status = 'Approved'",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Approved participants with their profiles, in join order.
    pub async fn approved_with_users(
        event_id: EventId,
        pool: &PgPool,
    ) -> Result<Vec<ParticipantWithUser>> {
        Self::with_users(event_id, "p.status = 'Approved'", pool).await
    }

    /// Everyone the host still has to look at or already accepted.
    pub async fn unrejected_with_users(
        event_id: EventId,
        pool: &PgPool,
    ) -> Result<Vec<ParticipantWithUser>> {
        Self::with_users(event_id, "p.status <> 'Rejected'", pool).await
    }

    async fn with_users(
        event_id: EventId,
        status_filter: &str,
        pool: &PgPool,
    ) -> Result<Vec<ParticipantWithUser>> {
        let sql = format!(
            r#"
            SELECT
                p.id AS participant_id, p.status, p.answer, p.created_at AS joined_at,
                u.id, u.user_id, u.username, u.profile_image
            FROM participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.event_id = $1 AND {status_filter}
            ORDER BY p.created_at
            "#
        );
        let participants = sqlx::query_as::<_, ParticipantWithUser>(&sql)
            .bind(event_id)
            .fetch_all(pool)
            .await?;
        Ok(participants)
    }

    /// Addresses of every non-rejected participant, read inside the caller's
    /// transaction before the rows disappear.
    pub async fn unrejected_contacts<'e>(
        event_id: EventId,
        db: impl PgExecutor<'e>,
    ) -> Result<Vec<ParticipantContact>> {
        let contacts = sqlx::query_as::<_, ParticipantContact>(
            r#"
            SELECT u.email, u.username
            FROM participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.event_id = $1 AND p.status <> 'Rejected'
            ORDER BY p.created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(db)
        .await?;
        Ok(contacts)
    }
}
