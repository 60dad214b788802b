mod messages;
mod rooms;

pub use messages::{delete_message, messages_for_room, save_message, update_message, SendMessageInput};
pub use rooms::{
    add_member, create_room, delete_room, get_room, list_rooms, require_room, update_room,
    CreateRoomInput, RoomDetail, UpdateRoomInput,
};
