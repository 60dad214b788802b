use anyhow::Result;
use sqlx::PgPool;

use crate::common::SubscriptionId;

/// Newsletter sign-ups collected from the landing page.
pub struct Subscription;

impl Subscription {
    /// Record an address. Returns `false` when it was already subscribed.
    pub async fn subscribe(email: &str, pool: &PgPool) -> Result<bool> {
        let inserted = sqlx::query(
            "INSERT INTO ad_emails (id, email) VALUES ($1, lower($2)) ON CONFLICT (email) DO NOTHING",
        )
        .bind(SubscriptionId::new())
        .bind(email.trim())
        .execute(pool)
        .await?;
        Ok(inserted.rows_affected() > 0)
    }
}
