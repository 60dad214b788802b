//! Participants domain - joining events and host approval.

pub mod actions;
pub mod models;

pub use actions::{
    approved_count, cancel_participation, check_participation, initial_status, join_event,
    participated_events, update_status, JoinEventInput,
};
pub use models::*;
