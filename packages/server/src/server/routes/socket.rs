//! Chat socket: `GET /socket`
//!
//! ```text
//! Client            SocketSession                 StreamHub
//!   │                    │                            │
//!   ├─ connect ─────────>├─ subscribe(lobby) ────────>│
//!   │<─ rooms ───────────┤                            │
//!   ├─ joinRoom ────────>├─ leave room-*, subscribe ─>│
//!   │                    ├─ publish userJoined ──────>│
//!   ├─ sendMessage ─────>├─ persist, publish ────────>│
//!   │<─ newMessage ──────┤<── forwarded ──────────────┤
//! ```
//!
//! Every frame is `{"event": ..., "data": ...}`. Failures are reported to the
//! sender only, as an `error` frame.

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Extension, WebSocketUpgrade,
    },
    response::Response,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::common::ChatRoomId;
use crate::domains::chatrooms::actions;
use crate::domains::chatrooms::socket::{
    error_frame, frame, ClientFrame, PresenceNotice, ROOMS, USER_JOINED, USER_LEFT,
};
use crate::kernel::stream_hub::{is_room_topic, room_topic, LOBBY_TOPIC};
use crate::kernel::{ServerDeps, StreamHub};
use crate::server::app::AppState;

pub async fn socket_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Topic subscriptions of one connection, each forwarded into its outbox.
pub struct SocketSession {
    connection_id: String,
    hub: StreamHub,
    outbox: mpsc::UnboundedSender<serde_json::Value>,
    topics: HashMap<String, JoinHandle<()>>,
}

impl SocketSession {
    pub fn new(hub: StreamHub, outbox: mpsc::UnboundedSender<serde_json::Value>) -> Self {
        Self {
            connection_id: uuid::Uuid::new_v4().to_string(),
            hub,
            outbox,
            topics: HashMap::new(),
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    pub fn send(&self, value: serde_json::Value) {
        // A closed outbox means the writer is gone; the read loop ends soon after.
        let _ = self.outbox.send(value);
    }

    pub async fn subscribe(&mut self, topic: &str) {
        if self.is_subscribed(topic) {
            return;
        }

        let mut rx = self.hub.subscribe(topic).await;
        let outbox = self.outbox.clone();
        let connection_id = self.connection_id.clone();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(value) => {
                        if outbox.send(value).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(connection_id = %connection_id, missed, "Socket fell behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.topics.insert(topic.to_string(), handle);
    }

    pub fn unsubscribe(&mut self, topic: &str) -> bool {
        match self.topics.remove(topic) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    fn presence(&self) -> PresenceNotice {
        PresenceNotice {
            user_id: self.connection_id.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Subscribe to a room without leaving others.
    pub async fn join(&mut self, room_id: ChatRoomId) {
        self.subscribe(&room_topic(room_id)).await;
    }

    /// Leave every room, enter `room_id` and announce the arrival there.
    pub async fn join_room(&mut self, room_id: ChatRoomId) {
        let current: Vec<String> = self
            .topics
            .keys()
            .filter(|topic| is_room_topic(topic))
            .cloned()
            .collect();
        for topic in current {
            self.unsubscribe(&topic);
        }

        let topic = room_topic(room_id);
        self.subscribe(&topic).await;
        self.hub.publish(&topic, frame(USER_JOINED, self.presence())).await;
    }

    pub async fn leave_room(&mut self, room_id: ChatRoomId) {
        let topic = room_topic(room_id);
        self.unsubscribe(&topic);
        self.hub.publish(&topic, frame(USER_LEFT, self.presence())).await;
    }

    pub async fn handle(&mut self, client_frame: ClientFrame, deps: &ServerDeps) {
        match client_frame {
            ClientFrame::Join(room) => self.join(room.room_id).await,
            ClientFrame::JoinRoom(room) => self.join_room(room.room_id).await,
            ClientFrame::LeaveRoom(room) => self.leave_room(room.room_id).await,
            ClientFrame::SendMessage(input) => {
                if let Err(e) = actions::save_message(input, deps).await {
                    warn!(connection_id = %self.connection_id, error = %e, "sendMessage failed");
                    self.send(error_frame("Failed to send message"));
                }
            }
            ClientFrame::CreateRoom(input) => {
                if let Err(e) = actions::create_room(input, deps).await {
                    warn!(connection_id = %self.connection_id, error = %e, "createRoom failed");
                    self.send(error_frame("Failed to create room"));
                }
            }
        }
    }

    /// Stop every forwarder and wait until each has dropped its receiver.
    pub async fn close(&mut self) {
        let handles: Vec<JoinHandle<()>> = self.topics.drain().map(|(_, handle)| handle).collect();
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(connection_id = %self.connection_id, error = %e, "Socket forwarder panicked");
                }
            }
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let deps = state.deps.clone();
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut outbox_rx) = mpsc::unbounded_channel::<serde_json::Value>();

    let mut writer = tokio::spawn(async move {
        while let Some(value) = outbox_rx.recv().await {
            if sink.send(Message::Text(value.to_string())).await.is_err() {
                break;
            }
        }
    });

    let mut session = SocketSession::new(deps.stream_hub.clone(), outbox);
    info!(connection_id = %session.connection_id(), "Socket connected");

    session.subscribe(LOBBY_TOPIC).await;
    match actions::list_rooms(None, &deps.db_pool).await {
        Ok(rooms) => session.send(frame(ROOMS, rooms)),
        Err(e) => {
            warn!(error = %e, "Failed to load rooms for socket");
            session.send(error_frame("Failed to fetch rooms"));
        }
    }

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let Some(Ok(message)) = incoming else { break };
                match message {
                    Message::Text(text) => match serde_json::from_str::<ClientFrame>(&text) {
                        Ok(client_frame) => session.handle(client_frame, &deps).await,
                        Err(e) => {
                            debug!(error = %e, "Unreadable socket frame");
                            session.send(error_frame("Invalid frame"));
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            _ = &mut writer => break,
        }
    }

    session.close().await;
    writer.abort();
    deps.stream_hub.cleanup().await;
    info!(connection_id = %session.connection_id(), "Socket disconnected");
}
