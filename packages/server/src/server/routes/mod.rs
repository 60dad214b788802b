// HTTP routes, one module per domain
pub mod chat;
pub mod events;
pub mod health;
pub mod likes;
pub mod mail;
pub mod participants;
pub mod reviews;
pub mod socket;
pub mod users;

pub use health::*;
pub use socket::socket_handler;
