//! Typed ids for every persisted entity.

pub use super::id::Id;

// ============================================================================
// Entity markers
// ============================================================================

pub struct User;
pub struct Event;
pub struct EventImage;
pub struct Participant;
pub struct Like;
pub struct ChatRoom;
pub struct ChatMessage;
pub struct Review;
pub struct ReviewImage;
pub struct Subscription;
pub struct Notification;

// ============================================================================
// Aliases
// ============================================================================

/// Internal primary key of a user. The public handle is the `user_id` string.
pub type UserId = Id<User>;
pub type EventId = Id<Event>;
pub type EventImageId = Id<EventImage>;
pub type ParticipantId = Id<Participant>;
pub type LikeId = Id<Like>;
pub type ChatRoomId = Id<ChatRoom>;
pub type ChatMessageId = Id<ChatMessage>;
pub type ReviewId = Id<Review>;
pub type ReviewImageId = Id<ReviewImage>;
pub type SubscriptionId = Id<Subscription>;
pub type NotificationId = Id<Notification>;
