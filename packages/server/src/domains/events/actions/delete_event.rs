use sqlx::PgPool;
use tracing::info;

use crate::common::validation::require_email;
use crate::common::{DomainError, DomainResult, EventId};
use crate::domains::events::models::{Event, Subscription};
use crate::domains::notifications::{notify, EventMailInfo, NotificationMessage};
use crate::domains::participants::models::Participant;

/// Delete an event and everything attached to it in one transaction.
///
/// With a `reason`, every participant who was not rejected is told after the
/// deletion commits.
pub async fn delete_event(
    event_id: EventId,
    reason: Option<&str>,
    pool: &PgPool,
) -> DomainResult<()> {
    let mut tx = pool.begin().await?;

    let event = Event::find_by_id(event_id, &mut *tx)
        .await?
        .ok_or_else(|| DomainError::not_found("Event", event_id))?;

    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    let recipients = match reason {
        Some(_) => Participant::unrejected_contacts(event.id, &mut *tx).await?,
        None => Vec::new(),
    };

    if !Event::delete_cascade(event.id, &mut *tx).await? {
        return Err(DomainError::not_found("Event", event_id));
    }
    tx.commit().await?;

    info!(event_id = %event_id, notified = recipients.len(), "Event deleted");

    if let Some(reason) = reason {
        let mail_info = EventMailInfo::from(&event);
        for contact in recipients {
            notify(
                &contact.email,
                NotificationMessage::EventDeleted {
                    guest_name: contact.username,
                    event: mail_info.clone(),
                    reason: reason.to_string(),
                },
                pool,
            )
            .await;
        }
    }

    Ok(())
}

/// Add an address to the newsletter list. Subscribing twice is fine.
pub async fn subscribe(email: &str, pool: &PgPool) -> DomainResult<()> {
    require_email(email)?;
    if Subscription::subscribe(email.trim(), pool).await? {
        info!(email = %email, "Newsletter subscription added");
    }
    Ok(())
}
