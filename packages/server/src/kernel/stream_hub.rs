//! In-process pub/sub hub behind the chat socket.
//!
//! Every chat room has a topic named `room-<id>`; a socket that joined the
//! room holds a receiver for it. [`LOBBY_TOPIC`] reaches every connected
//! socket and carries room-list updates such as `newRoom`.
//!
//! Payloads are already-encoded socket frames (`{"event": ..., "data": ...}`),
//! so the hub never inspects what it forwards.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::common::ChatRoomId;

/// Topic every socket subscribes to on connect.
pub const LOBBY_TOPIC: &str = "lobby";

/// Prefix shared by all per-room topics.
pub const ROOM_TOPIC_PREFIX: &str = "room-";

pub fn room_topic(room_id: ChatRoomId) -> String {
    format!("{}{}", ROOM_TOPIC_PREFIX, room_id)
}

pub fn is_room_topic(topic: &str) -> bool {
    topic.starts_with(ROOM_TOPIC_PREFIX)
}

#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish a frame to a topic. Returns how many receivers got it.
    pub async fn publish(&self, topic: &str, value: serde_json::Value) -> usize {
        let channels = self.channels.read().await;
        match channels.get(topic) {
            Some(tx) => tx.send(value).unwrap_or(0),
            None => 0,
        }
    }

    /// Subscribe to a topic, creating its channel on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    pub async fn has_topic(&self, topic: &str) -> bool {
        self.channels.read().await.contains_key(topic)
    }

    /// Drop channels nobody listens to anymore.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_topics_use_room_prefix() {
        let room = ChatRoomId::new();
        let topic = room_topic(room);
        assert_eq!(topic, format!("room-{}", room));
        assert!(is_room_topic(&topic));
        assert!(!is_room_topic(LOBBY_TOPIC));
    }

    #[tokio::test]
    async fn subscribers_receive_published_frames() {
        let hub = StreamHub::new();
        let mut rx = hub.subscribe("room-1").await;

        let frame = serde_json::json!({"event": "newMessage", "data": {"content": "hi"}});
        assert_eq!(hub.publish("room-1", frame.clone()).await, 1);

        assert_eq!(rx.recv().await.unwrap(), frame);
    }

    #[tokio::test]
    async fn publishing_to_unknown_topic_reaches_nobody() {
        let hub = StreamHub::new();
        assert_eq!(hub.publish("room-empty", serde_json::json!({})).await, 0);
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let hub = StreamHub::new();
        let mut a = hub.subscribe("room-a").await;
        let _b = hub.subscribe("room-b").await;

        hub.publish("room-b", serde_json::json!({"n": 1})).await;
        hub.publish("room-a", serde_json::json!({"n": 2})).await;

        assert_eq!(a.recv().await.unwrap(), serde_json::json!({"n": 2}));
    }

    #[tokio::test]
    async fn cleanup_removes_abandoned_channels() {
        let hub = StreamHub::new();
        let rx = hub.subscribe("room-gone").await;
        let _kept = hub.subscribe(LOBBY_TOPIC).await;
        drop(rx);

        hub.cleanup().await;

        let channels = hub.channels.read().await;
        assert!(!channels.contains_key("room-gone"));
        assert!(channels.contains_key(LOBBY_TOPIC));
    }
}
