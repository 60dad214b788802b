use sqlx::PgPool;
use tracing::debug;

use crate::common::{DomainError, DomainResult, EventId};
use crate::domains::events::models::Event;
use crate::domains::likes::models::Like;
use crate::domains::users::actions::require_user;
use crate::domains::users::User;

/// Like the event, or unlike it if already liked. Returns the new like count.
pub async fn toggle_like(event_id: EventId, user_id: &str, pool: &PgPool) -> DomainResult<i64> {
    let event = Event::find_by_id(event_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("Event", event_id))?;
    let user = require_user(user_id, pool).await?;

    let liked = if Like::exists(event.id, user.id, pool).await? {
        Like::delete(event.id, user.id, pool).await?;
        false
    } else {
        // A concurrent like of the same pair is absorbed by the unique constraint.
        Like::create(event.id, user.id, pool).await?;
        true
    };

    let count = Like::count_for_event(event.id, pool).await?;
    debug!(event_id = %event.id, user_id = %user.user_id, liked, count, "Like toggled");
    Ok(count)
}

/// Unknown users have liked nothing.
pub async fn is_liked(event_id: EventId, user_id: &str, pool: &PgPool) -> DomainResult<bool> {
    let Some(user) = User::find_by_user_id(user_id, pool).await? else {
        return Ok(false);
    };
    Ok(Like::exists(event_id, user.id, pool).await?)
}
