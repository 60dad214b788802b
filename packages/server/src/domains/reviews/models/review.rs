use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::common::{EventId, ReviewId, ReviewImageId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub rating: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewImage {
    pub id: ReviewImageId,
    pub review_id: ReviewId,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Raw aggregate over every review of a host's events.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct RatingAggregate {
    pub average: Option<f64>,
    pub count: i64,
}

impl Review {
    pub async fn create<'e>(
        event_id: EventId,
        user_id: UserId,
        rating: f64,
        comment: Option<&str>,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, event_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ReviewId::new())
        .bind(event_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(db)
        .await?;
        Ok(review)
    }

    pub async fn find_by_event(event_id: EventId, pool: &PgPool) -> Result<Vec<Self>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE event_id = $1 ORDER BY created_at DESC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }

    pub async fn find_by_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }

    pub async fn aggregate_for_host(host_id: UserId, pool: &PgPool) -> Result<RatingAggregate> {
        let aggregate = sqlx::query_as::<_, RatingAggregate>(
            r#"
            SELECT AVG(r.rating)::float8 AS average, COUNT(r.id) AS count
            FROM reviews r
            JOIN events e ON e.id = r.event_id
            WHERE e.created_by = $1
            "#,
        )
        .bind(host_id)
        .fetch_one(pool)
        .await?;
        Ok(aggregate)
    }
}

impl ReviewImage {
    pub async fn create<'e>(
        review_id: ReviewId,
        image_url: &str,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let image = sqlx::query_as::<_, ReviewImage>(
            r#"
            INSERT INTO review_images (id, review_id, image_url)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(ReviewImageId::new())
        .bind(review_id)
        .bind(image_url)
        .fetch_one(db)
        .await?;
        Ok(image)
    }

    pub async fn find_by_reviews(review_ids: &[ReviewId], pool: &PgPool) -> Result<Vec<Self>> {
        let ids: Vec<uuid::Uuid> = review_ids.iter().map(|id| id.into_uuid()).collect();
        let images = sqlx::query_as::<_, ReviewImage>(
            "SELECT * FROM review_images WHERE review_id = ANY($1) ORDER BY created_at",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(images)
    }
}
