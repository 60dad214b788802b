use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::common::validation::require_non_blank;
use crate::common::{ChatRoomId, DomainError, DomainResult};
use crate::domains::chatrooms::models::{ChatMessage, ChatMessageView, ChatRoom, RoomType};
use crate::domains::chatrooms::socket::{frame, NEW_ROOM};
use crate::domains::users::actions::require_user;
use crate::domains::users::UserSummary;
use crate::kernel::stream_hub::LOBBY_TOPIC;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomInput {
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomInput {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: ChatRoom,
    pub members: Vec<UserSummary>,
    pub messages: Vec<ChatMessageView>,
}

pub async fn require_room(room_id: ChatRoomId, pool: &PgPool) -> DomainResult<ChatRoom> {
    ChatRoom::find_by_id(room_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("ChatRoom", room_id))
}

pub async fn list_rooms(room_type: Option<RoomType>, pool: &PgPool) -> DomainResult<Vec<ChatRoom>> {
    Ok(ChatRoom::list(room_type, pool).await?)
}

pub async fn get_room(room_id: ChatRoomId, pool: &PgPool) -> DomainResult<RoomDetail> {
    let room = require_room(room_id, pool).await?;
    Ok(RoomDetail {
        members: ChatRoom::members(room.id, pool).await?,
        messages: ChatMessage::find_by_room(room.id, pool).await?,
        room,
    })
}

/// Create a room with no members and announce it to every connected socket.
pub async fn create_room(input: CreateRoomInput, deps: &ServerDeps) -> DomainResult<ChatRoom> {
    require_non_blank("name", &input.name)?;
    let room_type: RoomType = input
        .room_type
        .parse()
        .map_err(|e: anyhow::Error| DomainError::validation(e.to_string()))?;

    let room = ChatRoom::create(input.name.trim(), room_type, None, &deps.db_pool).await?;
    info!(room_id = %room.id, room_type = %room_type, "Chat room created");

    deps.stream_hub
        .publish(LOBBY_TOPIC, frame(NEW_ROOM, &room))
        .await;
    Ok(room)
}

pub async fn update_room(
    room_id: ChatRoomId,
    input: UpdateRoomInput,
    pool: &PgPool,
) -> DomainResult<ChatRoom> {
    let Some(name) = input.name else {
        return require_room(room_id, pool).await;
    };
    require_non_blank("name", &name)?;

    ChatRoom::rename(room_id, name.trim(), pool)
        .await?
        .ok_or_else(|| DomainError::not_found("ChatRoom", room_id))
}

pub async fn delete_room(room_id: ChatRoomId, pool: &PgPool) -> DomainResult<()> {
    if !ChatRoom::delete(room_id, pool).await? {
        return Err(DomainError::not_found("ChatRoom", room_id));
    }
    info!(room_id = %room_id, "Chat room deleted");
    Ok(())
}

/// Adding an existing member is a no-op.
pub async fn add_member(room_id: ChatRoomId, user_id: &str, pool: &PgPool) -> DomainResult<()> {
    let room = require_room(room_id, pool).await?;
    let user = require_user(user_id, pool).await?;
    if ChatRoom::add_member(room.id, user.id, pool).await? {
        info!(room_id = %room.id, user_id = %user.user_id, "Member added to chat room");
    }
    Ok(())
}
