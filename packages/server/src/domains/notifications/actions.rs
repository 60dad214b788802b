//! Enqueue helpers used by other domains after their own writes commit.

use sqlx::PgPool;
use tracing::{debug, warn};

use super::models::Notification;
use super::NotificationMessage;

/// Queue an email without letting a failure escape.
///
/// Callers have already committed the state change the email describes;
/// losing the email must not undo it.
pub async fn notify(recipient: &str, message: NotificationMessage, pool: &PgPool) {
    match Notification::enqueue(recipient, &message, pool).await {
        Ok(notification) => {
            debug!(notification_id = %notification.id, kind = message.kind(), "notification queued");
        }
        Err(e) => {
            warn!(error = %e, kind = message.kind(), recipient = %recipient, "failed to queue notification");
        }
    }
}
