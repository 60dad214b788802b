//! Events domain - creation, listings, detail pages and deletion.

pub mod actions;
pub mod models;

pub use actions::*;
pub use models::*;
