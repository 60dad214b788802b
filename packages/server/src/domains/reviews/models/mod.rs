pub mod review;

pub use review::{RatingAggregate, Review, ReviewImage};
