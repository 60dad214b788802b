// Event gathering backend - API core
//
// Users host and join events, chat in event rooms, like and review events,
// and receive transactional email. Domains live in domains/*; shared
// infrastructure in kernel/; the HTTP and socket surface in server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
