//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod mailer;
pub mod stream_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use mailer::{LogMailer, SmtpMailer};
pub use stream_hub::StreamHub;
pub use test_dependencies::{MockMailer, TestDependencies};
pub use traits::*;
