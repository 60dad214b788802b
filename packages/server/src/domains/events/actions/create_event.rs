//! Event creation as one unit of work.
//!
//! ```text
//! BEGIN
//!   ├─► verify creator
//!   ├─► insert event
//!   ├─► insert event chat room, seed creator membership
//!   └─► insert images (validated)
//! COMMIT   (any failure: ROLLBACK, nothing persisted)
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, error, info, warn};

use crate::common::validation::{require_image_url, require_non_blank};
use crate::common::{DomainError, DomainResult};
use crate::domains::chatrooms::models::{ChatRoom, RoomType};
use crate::domains::events::models::{Event, EventImage, NewEvent};
use crate::domains::users::User;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    /// Public handle of the host
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_detail: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// `HH:MM` or `HH:MM:SS`
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub max_participants: Option<i32>,
    #[serde(default)]
    pub min_participants: Option<i32>,
    #[serde(default)]
    pub price: Option<i32>,
    #[serde(default)]
    pub question: Option<String>,
}

pub fn parse_event_time(raw: &str) -> DomainResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| DomainError::validation(format!("Invalid event time: {}", raw)))
}

fn validate(input: &CreateEventInput) -> DomainResult<()> {
    require_non_blank("name", &input.name)?;
    for (field, value) in [
        ("maxParticipants", input.max_participants),
        ("minParticipants", input.min_participants),
    ] {
        if matches!(value, Some(n) if n <= 0) {
            return Err(DomainError::validation(format!("{} must be positive", field)));
        }
    }
    if let (Some(min), Some(max)) = (input.min_participants, input.max_participants) {
        if min > max {
            return Err(DomainError::validation(
                "minParticipants must not exceed maxParticipants",
            ));
        }
    }
    Ok(())
}

/// Create an event with its chat room and gallery. All or nothing.
pub async fn create_event(input: CreateEventInput, pool: &PgPool) -> DomainResult<Event> {
    validate(&input)?;
    let time = input.time.as_deref().map(parse_event_time).transpose()?;

    let mut tx = pool.begin().await?;
    debug!(user_id = %input.user_id, "create_event transaction started");

    match insert_event(&input, time, &mut *tx).await {
        Ok(event) => {
            tx.commit().await?;
            info!(event_id = %event.id, user_id = %input.user_id, "Event created");
            Ok(event)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(user_id = %input.user_id, error = %rollback_err, "create_event rollback failed");
            }
            error!(user_id = %input.user_id, error = %e, "create_event rolled back");
            Err(e)
        }
    }
}

async fn insert_event(
    input: &CreateEventInput,
    time: Option<NaiveTime>,
    conn: &mut PgConnection,
) -> DomainResult<Event> {
    let creator = User::find_by_user_id(&input.user_id, &mut *conn)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &input.user_id))?;

    let event = Event::create(
        NewEvent::builder()
            .name(input.name.trim())
            .description(input.description.clone())
            .question(input.question.clone())
            .location(input.location.clone())
            .location_detail(input.location_detail.clone())
            .date(input.date)
            .time(time)
            .event_type(input.event_type.clone())
            .category(input.category.clone())
            .main_image(input.main_image.clone())
            .price(input.price)
            .max_participants(input.max_participants)
            .min_participants(input.min_participants)
            .build(),
        creator.id,
        &mut *conn,
    )
    .await?;

    let room = ChatRoom::create(&event.name, RoomType::Event, Some(event.id), &mut *conn).await?;
    ChatRoom::add_member(room.id, creator.id, &mut *conn).await?;
    debug!(event_id = %event.id, room_id = %room.id, "Event chat room created");

    for (position, url) in input.images.iter().enumerate() {
        require_image_url(url)?;
        EventImage::create(event.id, url.trim(), position as i32, &mut *conn).await?;
    }
    if !input.images.is_empty() {
        debug!(event_id = %event.id, count = input.images.len(), "Event images saved");
    }

    Ok(event)
}
