//! `/chatrooms/*` and `/chatmessages/*`

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::common::{ChatMessageId, ChatRoomId, DomainError};
use crate::domains::chatrooms::actions::{
    self, CreateRoomInput, RoomDetail, SendMessageInput, UpdateRoomInput,
};
use crate::domains::chatrooms::models::{ChatMessage, ChatMessageView, ChatRoom, RoomType};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::routes::users::MessageResponse;

#[derive(Debug, Default, Deserialize)]
pub struct RoomListQuery {
    #[serde(rename = "type")]
    pub room_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub content: String,
}

pub async fn list_rooms(
    Extension(state): Extension<AppState>,
    Query(query): Query<RoomListQuery>,
) -> ApiResult<Json<Vec<ChatRoom>>> {
    let room_type = query
        .room_type
        .as_deref()
        .map(str::parse::<RoomType>)
        .transpose()
        .map_err(|e| DomainError::validation(e.to_string()))?;
    Ok(Json(actions::list_rooms(room_type, state.pool()).await?))
}

pub async fn create_room(
    Extension(state): Extension<AppState>,
    Json(input): Json<CreateRoomInput>,
) -> ApiResult<(StatusCode, Json<ChatRoom>)> {
    let room = actions::create_room(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get_room(
    Extension(state): Extension<AppState>,
    Path(room_id): Path<ChatRoomId>,
) -> ApiResult<Json<RoomDetail>> {
    Ok(Json(actions::get_room(room_id, state.pool()).await?))
}

pub async fn update_room(
    Extension(state): Extension<AppState>,
    Path(room_id): Path<ChatRoomId>,
    Json(input): Json<UpdateRoomInput>,
) -> ApiResult<Json<ChatRoom>> {
    Ok(Json(actions::update_room(room_id, input, state.pool()).await?))
}

pub async fn delete_room(
    Extension(state): Extension<AppState>,
    Path(room_id): Path<ChatRoomId>,
) -> ApiResult<Json<MessageResponse>> {
    actions::delete_room(room_id, state.pool()).await?;
    Ok(MessageResponse::new("Room deleted"))
}

pub async fn send_message(
    Extension(state): Extension<AppState>,
    Json(input): Json<SendMessageInput>,
) -> ApiResult<(StatusCode, Json<ChatMessageView>)> {
    let message = actions::save_message(input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn messages_for_room(
    Extension(state): Extension<AppState>,
    Path(room_id): Path<ChatRoomId>,
) -> ApiResult<Json<Vec<ChatMessageView>>> {
    Ok(Json(actions::messages_for_room(room_id, state.pool()).await?))
}

pub async fn update_message(
    Extension(state): Extension<AppState>,
    Path(message_id): Path<ChatMessageId>,
    Json(request): Json<UpdateMessageRequest>,
) -> ApiResult<Json<ChatMessage>> {
    Ok(Json(
        actions::update_message(message_id, &request.content, state.pool()).await?,
    ))
}

pub async fn delete_message(
    Extension(state): Extension<AppState>,
    Path(message_id): Path<ChatMessageId>,
) -> ApiResult<Json<MessageResponse>> {
    actions::delete_message(message_id, state.pool()).await?;
    Ok(MessageResponse::new("Message deleted successfully"))
}
