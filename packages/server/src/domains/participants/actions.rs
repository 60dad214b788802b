//! Joining events and the host's approve / reject decisions.
//!
//! ```text
//! join_event ─► Participant (Pending | Approved)
//!                   │ Approved + room ─► chat membership
//!                   └─► notify host
//! update_status ─► Approved ─► chat membership ─► notify guest
//!               └► Rejected ─────────────────────► notify guest
//! ```

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::common::{DomainError, DomainResult, EventId, ParticipantId, UserId};
use crate::domains::chatrooms::models::ChatRoom;
use crate::domains::events::models::{Event, EventSummary};
use crate::domains::notifications::{notify, EventMailInfo, NotificationMessage};
use crate::domains::participants::models::{Participant, ParticipantStatus};
use crate::domains::users::actions::require_user;
use crate::domains::users::User;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinEventInput {
    pub event_id: EventId,
    /// Public handle of the joining user
    pub user_id: String,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Status a new participation starts in.
///
/// The host is always in; Register events wait for the host's decision.
pub fn initial_status(event: &Event, user_id: UserId) -> ParticipantStatus {
    if event.created_by == user_id || !event.requires_approval() {
        ParticipantStatus::Approved
    } else {
        ParticipantStatus::Pending
    }
}

async fn require_event(event_id: EventId, pool: &PgPool) -> DomainResult<Event> {
    Event::find_by_id(event_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("Event", event_id))
}

/// Add the user to the event's room, if it has one.
async fn grant_room_access(event: &Event, user: &User, pool: &PgPool) -> DomainResult<()> {
    match ChatRoom::find_by_event(event.id, pool).await? {
        Some(room) => {
            if ChatRoom::add_member(room.id, user.id, pool).await? {
                info!(room_id = %room.id, user_id = %user.user_id, "Added participant to event room");
            }
        }
        None => {
            warn!(event_id = %event.id, "Event has no chat room; skipping membership");
        }
    }
    Ok(())
}

pub async fn join_event(input: JoinEventInput, pool: &PgPool) -> DomainResult<Participant> {
    let event = require_event(input.event_id, pool).await?;
    let user = require_user(&input.user_id, pool).await?;

    if Participant::find(event.id, user.id, pool).await?.is_some() {
        return Err(DomainError::conflict("User has already joined this event"));
    }

    let status = initial_status(&event, user.id);
    // A concurrent join loses on the unique constraint and surfaces as Conflict.
    let participant =
        Participant::create(event.id, user.id, status, input.answer.as_deref(), pool).await?;

    info!(
        event_id = %event.id,
        user_id = %user.user_id,
        status = %status,
        "Participant joined event"
    );

    if status == ParticipantStatus::Approved {
        grant_room_access(&event, &user, pool).await?;
    }

    match User::find_by_id(event.created_by, pool).await {
        Ok(Some(host)) => {
            notify(
                &host.email,
                NotificationMessage::ParticipantJoined {
                    host_name: host.username,
                    participant_name: user.username.clone(),
                    event: EventMailInfo::from(&event),
                },
                pool,
            )
            .await;
        }
        Ok(None) => warn!(event_id = %event.id, "Event host not found; no join notification"),
        Err(e) => warn!(event_id = %event.id, error = %e, "Failed to load event host"),
    }

    Ok(participant)
}

/// Record the host's decision on a participant.
///
/// Any decided status may be overwritten; only Pending is refused as a target.
pub async fn update_status(
    participant_id: ParticipantId,
    status: ParticipantStatus,
    event_id: EventId,
    pool: &PgPool,
) -> DomainResult<Participant> {
    if !status.is_decided() {
        return Err(DomainError::validation("Status must be Approved or Rejected"));
    }

    let participant = Participant::find_by_id(participant_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("Participant", participant_id))?;
    let event = require_event(event_id, pool).await?;

    if participant.event_id != event.id {
        return Err(DomainError::validation(format!(
            "Participant {} does not belong to event {}",
            participant_id, event_id
        )));
    }

    let user = User::find_by_id(participant.user_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("User", participant.user_id))?;

    if let Ok(previous) = participant.parsed_status() {
        if previous.is_decided() && previous != status {
            warn!(
                participant_id = %participant_id,
                from = %previous,
                to = %status,
                "Overwriting a decided participant status"
            );
        }
    }

    let updated = Participant::set_status(participant_id, status, pool).await?;
    info!(
        participant_id = %participant_id,
        event_id = %event.id,
        status = %status,
        "Participant status updated"
    );

    if status == ParticipantStatus::Approved {
        grant_room_access(&event, &user, pool).await?;
    }

    let message = match status {
        ParticipantStatus::Approved => NotificationMessage::ParticipantApproved {
            guest_name: user.username.clone(),
            event: EventMailInfo::from(&event),
        },
        _ => NotificationMessage::ParticipantRejected {
            guest_name: user.username.clone(),
            event: EventMailInfo::from(&event),
        },
    };
    notify(&user.email, message, pool).await;

    Ok(updated)
}

/// Unknown users are simply not participating.
pub async fn check_participation(
    event_id: EventId,
    user_id: &str,
    pool: &PgPool,
) -> DomainResult<bool> {
    let Some(user) = User::find_by_user_id(user_id, pool).await? else {
        return Ok(false);
    };
    Ok(Participant::find(event_id, user.id, pool).await?.is_some())
}

pub async fn participated_events(user_id: &str, pool: &PgPool) -> DomainResult<Vec<EventSummary>> {
    let user = require_user(user_id, pool).await?;
    Ok(Event::list_participated_by(user.id, pool).await?)
}

pub async fn cancel_participation(
    user_id: &str,
    event_id: EventId,
    pool: &PgPool,
) -> DomainResult<()> {
    let user = require_user(user_id, pool).await?;
    let event = require_event(event_id, pool).await?;

    if !Participant::delete(event.id, user.id, pool).await? {
        return Err(DomainError::not_found(
            "Participant",
            format!("{} in {}", user_id, event_id),
        ));
    }

    info!(event_id = %event_id, user_id = %user_id, "Participation cancelled");
    Ok(())
}

pub async fn approved_count(event_id: EventId, pool: &PgPool) -> DomainResult<i64> {
    Ok(Participant::count_approved(event_id, pool).await?)
}
