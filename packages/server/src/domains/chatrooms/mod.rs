//! Chatrooms domain - rooms, membership, messages and the socket protocol.

pub mod actions;
pub mod models;
pub mod socket;

pub use models::*;
