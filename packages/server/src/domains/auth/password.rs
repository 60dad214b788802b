//! Password hashing and temporary credentials.

use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Hash off the async runtime; bcrypt is deliberately slow.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?
        .context("Stored password hash is malformed")
}

/// Random alphanumeric string, used for temporary passwords.
pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
