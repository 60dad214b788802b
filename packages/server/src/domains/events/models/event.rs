use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{EventId, UserId};

/// Event type whose joiners wait for host approval.
pub const REGISTER_EVENT_TYPE: &str = "Register";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub question: Option<String>,
    pub location: Option<String>,
    pub location_detail: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub category: Option<String>,
    pub main_image: Option<String>,
    pub price: Option<i32>,
    pub max_participants: Option<i32>,
    pub min_participants: Option<i32>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewEvent {
    pub name: String,
    #[builder(default)]
    pub description: Option<String>,
    #[builder(default)]
    pub question: Option<String>,
    #[builder(default)]
    pub location: Option<String>,
    #[builder(default)]
    pub location_detail: Option<String>,
    #[builder(default)]
    pub date: Option<NaiveDate>,
    #[builder(default)]
    pub time: Option<NaiveTime>,
    #[builder(default)]
    pub event_type: Option<String>,
    #[builder(default)]
    pub category: Option<String>,
    #[builder(default)]
    pub main_image: Option<String>,
    #[builder(default)]
    pub price: Option<i32>,
    #[builder(default)]
    pub max_participants: Option<i32>,
    #[builder(default)]
    pub min_participants: Option<i32>,
}

/// Host reference embedded in listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HostRef {
    pub user_id: String,
    pub username: String,
}

/// Listing card: event fields plus approved participant and like counts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub category: Option<String>,
    pub price: Option<i32>,
    pub max_participants: Option<i32>,
    #[sqlx(flatten)]
    pub created_by: HostRef,
    /// Approved participants only
    pub participants: i64,
    pub likes: i64,
}

/// Optional filters for search listings; absent fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

const SUMMARY_SELECT: &str = r#"
    SELECT
        e.id, e.name, e.description, e.main_image, e.location, e.date, e.time,
        e.event_type, e.category, e.price, e.max_participants,
        u.user_id, u.username,
        (SELECT COUNT(*) FROM participants p
            WHERE p.event_id = e.id AND p.status = 'Approved') AS participants,
        (SELECT COUNT(*) FROM likes l WHERE l.event_id = e.id) AS likes
    FROM events e
    JOIN users u ON u.id = e.created_by
"#;

/// Events without a date are never considered past; a dated event without a
/// time runs until the end of its day.
const NOT_PAST: &str =
    "(e.date IS NULL OR e.date + COALESCE(e.time, TIME '23:59:59') >= LOCALTIMESTAMP)";

impl Event {
    pub fn requires_approval(&self) -> bool {
        self.event_type.as_deref() == Some(REGISTER_EVENT_TYPE)
    }

    pub async fn find_by_id<'e>(id: EventId, db: impl PgExecutor<'e>) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(event)
    }

    pub async fn create<'e>(
        new_event: NewEvent,
        created_by: UserId,
        db: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, name, description, question, location, location_detail,
                date, time, event_type, category, main_image, price,
                max_participants, min_participants, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(EventId::new())
        .bind(new_event.name)
        .bind(new_event.description)
        .bind(new_event.question)
        .bind(new_event.location)
        .bind(new_event.location_detail)
        .bind(new_event.date)
        .bind(new_event.time)
        .bind(new_event.event_type)
        .bind(new_event.category)
        .bind(new_event.main_image)
        .bind(new_event.price)
        .bind(new_event.max_participants)
        .bind(new_event.min_participants)
        .bind(created_by)
        .fetch_one(db)
        .await?;
        Ok(event)
    }

    pub async fn ids_by_creator<'e>(
        created_by: UserId,
        db: impl PgExecutor<'e>,
    ) -> Result<Vec<EventId>> {
        let ids = sqlx::query_scalar::<_, EventId>("SELECT id FROM events WHERE created_by = $1")
            .bind(created_by)
            .fetch_all(db)
            .await?;
        Ok(ids)
    }

    pub async fn count_by_creator(created_by: UserId, pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE created_by = $1")
            .bind(created_by)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Remove an event and everything hanging off it, inside the caller's
    /// transaction. Returns `false` when the event did not exist.
    pub async fn delete_cascade(id: EventId, conn: &mut PgConnection) -> Result<bool> {
        sqlx::query(
            "DELETE FROM review_images WHERE review_id IN (SELECT id FROM reviews WHERE event_id = $1)",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        for statement in [
            "DELETE FROM reviews WHERE event_id = $1",
            "DELETE FROM participants WHERE event_id = $1",
            "DELETE FROM likes WHERE event_id = $1",
            "DELETE FROM event_images WHERE event_id = $1",
            "DELETE FROM chat_messages WHERE room_id IN (SELECT id FROM chat_rooms WHERE event_id = $1)",
            "DELETE FROM chat_room_members WHERE room_id IN (SELECT id FROM chat_rooms WHERE event_id = $1)",
            "DELETE FROM chat_rooms WHERE event_id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *conn).await?;
        }

        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Current and undated events, newest first.
    pub async fn list_current(pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE {NOT_PAST} ORDER BY e.created_at DESC");
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    /// Events dated today or later, most liked first.
    pub async fn list_hot(pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE e.date >= CURRENT_DATE ORDER BY likes DESC, e.date, e.time"
        );
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    /// Dated events that have not started yet, soonest first.
    pub async fn list_upcoming(pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE e.date IS NOT NULL AND {NOT_PAST} ORDER BY e.date, e.time NULLS LAST"
        );
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    /// Events dated today or later, ordered by date.
    pub async fn list_from_today_by_date(pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE e.date >= CURRENT_DATE ORDER BY e.date, e.time NULLS LAST"
        );
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    pub async fn list_by_category(category: &str, pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE e.category = $1 ORDER BY e.created_at DESC");
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(category)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    pub async fn search(filter: &SearchFilter, pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!(
            r#"{SUMMARY_SELECT}
            WHERE ($1::text IS NULL OR e.name ILIKE '%' || $1 || '%')
              AND ($2::date IS NULL OR e.date = $2)
              AND ($3::text IS NULL OR e.location = $3)
              AND ($4::text IS NULL OR e.event_type = $4)
            ORDER BY e.created_at DESC"#
        );
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(filter.query.as_deref().filter(|q| !q.trim().is_empty()))
            .bind(filter.date)
            .bind(filter.location.as_deref().filter(|l| !l.trim().is_empty()))
            .bind(filter.event_type.as_deref().filter(|t| !t.trim().is_empty()))
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    pub async fn list_by_host(user_id: &str, pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE u.user_id = $1 ORDER BY e.created_at DESC");
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    /// Events the user liked, most recent like first.
    pub async fn list_liked_by(user_id: UserId, pool: &PgPool) -> Result<Vec<EventSummary>> {
        let sql = format!(
            r#"{SUMMARY_SELECT}
            JOIN likes mine ON mine.event_id = e.id AND mine.user_id = $1
            ORDER BY mine.created_at DESC"#
        );
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }

    /// Events where the user is an approved participant, latest first.
    pub async fn list_participated_by(
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<EventSummary>> {
        let sql = format!(
            r#"{SUMMARY_SELECT}
            JOIN participants mine
                ON mine.event_id = e.id AND mine.user_id = $1 AND mine.status = 'Approved'
            ORDER BY mine.created_at DESC"#
        );
        let events = sqlx::query_as::<_, EventSummary>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_of_type(event_type: Option<&str>) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            name: "Board games".to_string(),
            description: None,
            question: None,
            location: None,
            location_detail: None,
            date: None,
            time: None,
            event_type: event_type.map(str::to_string),
            category: None,
            main_image: None,
            price: None,
            max_participants: None,
            min_participants: None,
            created_by: UserId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_register_events_require_approval() {
        assert!(event_of_type(Some("Register")).requires_approval());
        assert!(!event_of_type(Some("FirstCome")).requires_approval());
        assert!(!event_of_type(None).requires_approval());
    }

    #[test]
    fn event_type_serializes_as_type() {
        let json = serde_json::to_value(event_of_type(Some("Register"))).unwrap();
        assert_eq!(json["type"], "Register");
        assert!(json.get("eventType").is_none());
        assert!(json.get("createdBy").is_some());
    }
}
