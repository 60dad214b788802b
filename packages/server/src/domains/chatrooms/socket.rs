//! Frames exchanged over the chat socket.
//!
//! Every frame is `{"event": "<name>", "data": {...}}` in both directions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ChatRoomId;
use crate::domains::chatrooms::actions::{CreateRoomInput, SendMessageInput};

pub const ROOMS: &str = "rooms";
pub const NEW_ROOM: &str = "newRoom";
pub const NEW_MESSAGE: &str = "newMessage";
pub const USER_JOINED: &str = "userJoined";
pub const USER_LEFT: &str = "userLeft";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: ChatRoomId,
}

/// Frames a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientFrame {
    /// Subscribe to a room's messages.
    Join(RoomRef),
    /// Switch rooms: leaves every other room first and announces the arrival.
    JoinRoom(RoomRef),
    LeaveRoom(RoomRef),
    SendMessage(SendMessageInput),
    CreateRoom(CreateRoomInput),
}

/// `userJoined` / `userLeft` payload. `user_id` is the connection id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceNotice {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorNotice {
    pub message: String,
}

pub fn frame(event: &str, data: impl Serialize) -> serde_json::Value {
    serde_json::json!({
        "event": event,
        "data": serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
    })
}

pub fn error_frame(message: impl Into<String>) -> serde_json::Value {
    frame(
        ERROR,
        ErrorNotice {
            message: message.into(),
        },
    )
}
