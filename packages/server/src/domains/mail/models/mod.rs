pub mod verification;

pub use verification::{EmailVerification, VERIFICATION_TTL_MINUTES};
