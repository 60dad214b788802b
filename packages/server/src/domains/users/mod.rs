//! Users domain - accounts, credentials and profiles.

pub mod actions;
pub mod models;

pub use models::*;
