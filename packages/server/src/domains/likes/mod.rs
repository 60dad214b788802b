//! Likes domain - one like per (event, user), toggled.

pub mod actions;
pub mod models;

pub use actions::{is_liked, toggle_like};
pub use models::*;
