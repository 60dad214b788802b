// Business domains
pub mod auth;
pub mod chatrooms;
pub mod events;
pub mod likes;
pub mod mail;
pub mod notifications;
pub mod participants;
pub mod reviews;
pub mod users;
