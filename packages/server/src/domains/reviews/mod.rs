//! Reviews domain - ratings of past events and host averages.

pub mod actions;
pub mod models;

pub use actions::{
    create_review, host_rating, is_valid_rating, reviews_by_user, reviews_for_event,
    CreateReviewInput, HostRating, ReviewView,
};
pub use models::*;
