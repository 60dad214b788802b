//! Mail domain - verification codes and password recovery emails.

pub mod actions;
pub mod models;

pub use models::*;
