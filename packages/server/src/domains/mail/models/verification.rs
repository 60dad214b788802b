use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Codes expire this many minutes after they were issued.
pub const VERIFICATION_TTL_MINUTES: i64 = 10;

/// Pending email verification code. One per address.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailVerification {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl EmailVerification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > chrono::Duration::minutes(VERIFICATION_TTL_MINUTES)
    }

    /// Whether `code` matches and is still fresh at `now`.
    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && self.code.eq_ignore_ascii_case(code.trim())
    }

    /// Store a fresh code, replacing any previous one for the address.
    pub async fn replace(email: &str, code: &str, pool: &PgPool) -> Result<Self> {
        let verification = sqlx::query_as::<_, EmailVerification>(
            r#"
            INSERT INTO email_verifications (email, code, created_at)
            VALUES (lower($1), $2, NOW())
            ON CONFLICT (email) DO UPDATE
                SET code = EXCLUDED.code, created_at = EXCLUDED.created_at
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(code)
        .fetch_one(pool)
        .await?;
        Ok(verification)
    }

    pub async fn find(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        let verification = sqlx::query_as::<_, EmailVerification>(
            "SELECT * FROM email_verifications WHERE email = lower($1)",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;
        Ok(verification)
    }

    pub async fn delete(email: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM email_verifications WHERE email = lower($1)")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(())
    }
}
