//! Auth domain - credentials and session tokens
//!
//! Responsibilities:
//! - bcrypt password hashing
//! - JWT issuing / verification for signed-in users

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use password::{hash_password, random_token, verify_password};
