pub mod message;
pub mod room;

pub use message::{ChatMessage, ChatMessageView};
pub use room::{ChatRoom, RoomType};
