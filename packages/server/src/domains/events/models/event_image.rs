use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;

use crate::common::{EventId, EventImageId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventImage {
    pub id: EventImageId,
    pub event_id: EventId,
    pub image_url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl EventImage {
    pub async fn create<'e>(
        event_id: EventId,
        image_url: &str,
        position: i32,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let image = sqlx::query_as::<_, EventImage>(
            r#"
            INSERT INTO event_images (id, event_id, image_url, position)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(EventImageId::new())
        .bind(event_id)
        .bind(image_url)
        .bind(position)
        .fetch_one(db)
        .await?;
        Ok(image)
    }

    pub async fn find_by_event<'e>(event_id: EventId, db: impl PgExecutor<'e>) -> Result<Vec<Self>> {
        let images = sqlx::query_as::<_, EventImage>(
            "SELECT * FROM event_images WHERE event_id = $1 ORDER BY position",
        )
        .bind(event_id)
        .fetch_all(db)
        .await?;
        Ok(images)
    }
}
