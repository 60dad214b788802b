use serde::Deserialize;
use sqlx::PgPool;
use tracing::debug;

use crate::common::validation::require_non_blank;
use crate::common::{ChatMessageId, ChatRoomId, DomainError, DomainResult};
use crate::domains::chatrooms::actions::require_room;
use crate::domains::chatrooms::models::{ChatMessage, ChatMessageView, ChatRoom};
use crate::domains::chatrooms::socket::{frame, NEW_MESSAGE};
use crate::domains::users::actions::require_user;
use crate::kernel::stream_hub::room_topic;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub room_id: ChatRoomId,
    /// Public handle of the sender; absent for system messages
    #[serde(default)]
    pub sender_id: Option<String>,
    pub content: String,
}

/// Persist a message, bump the room's activity, then push it to the room.
pub async fn save_message(input: SendMessageInput, deps: &ServerDeps) -> DomainResult<ChatMessageView> {
    let pool = &deps.db_pool;
    require_non_blank("content", &input.content)?;
    let room = require_room(input.room_id, pool).await?;
    let sender = match input.sender_id.as_deref() {
        Some(handle) => Some(require_user(handle, pool).await?),
        None => None,
    };

    let mut tx = pool.begin().await?;
    let message =
        ChatMessage::create(room.id, sender.as_ref().map(|u| u.id), &input.content, &mut *tx)
            .await?;
    ChatRoom::touch_last_message(room.id, message.sent_at, &mut *tx).await?;
    tx.commit().await?;

    let view = ChatMessageView {
        id: message.id,
        room_id: message.room_id,
        sender_id: message.sender_id,
        sender_user_id: sender.as_ref().map(|u| u.user_id.clone()),
        sender_username: sender.as_ref().map(|u| u.username.clone()),
        sender_profile_image: sender.as_ref().and_then(|u| u.profile_image.clone()),
        content: message.content,
        sent_at: message.sent_at,
    };

    let receivers = deps
        .stream_hub
        .publish(&room_topic(room.id), frame(NEW_MESSAGE, &view))
        .await;
    debug!(room_id = %room.id, message_id = %view.id, receivers, "Message published");

    Ok(view)
}

/// Room history, oldest first.
pub async fn messages_for_room(
    room_id: ChatRoomId,
    pool: &PgPool,
) -> DomainResult<Vec<ChatMessageView>> {
    let room = require_room(room_id, pool).await?;
    Ok(ChatMessage::find_by_room(room.id, pool).await?)
}

pub async fn update_message(
    message_id: ChatMessageId,
    content: &str,
    pool: &PgPool,
) -> DomainResult<ChatMessage> {
    require_non_blank("content", content)?;
    ChatMessage::update_content(message_id, content, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("ChatMessage", message_id))
}

pub async fn delete_message(message_id: ChatMessageId, pool: &PgPool) -> DomainResult<()> {
    if !ChatMessage::delete(message_id, pool).await? {
        return Err(DomainError::not_found("ChatMessage", message_id));
    }
    Ok(())
}
