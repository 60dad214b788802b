//! Notifications domain - transactional email outbox.
//!
//! Domains record what happened with [`notify`]; the
//! [`NotificationDispatcher`] renders and delivers in the background.

pub mod actions;
pub mod dispatcher;
pub mod message;
pub mod models;

pub use actions::notify;
pub use dispatcher::{dispatch_pending, DispatchReport, DispatcherConfig, NotificationDispatcher};
pub use message::{EventMailInfo, NotificationMessage};
pub use models::*;
