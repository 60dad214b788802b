pub mod user;

pub use user::{NewUser, ProfileUpdate, User, UserSummary, PASSWORD_MAX_AGE_DAYS};
