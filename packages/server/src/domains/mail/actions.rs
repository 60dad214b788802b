//! Email verification codes and password recovery.
//!
//! These emails are the point of the request, so they are sent inline and a
//! delivery failure is reported to the caller.

use tracing::{error, info};

use crate::common::validation::require_email;
use crate::common::{DomainError, DomainResult};
use crate::domains::auth::{hash_password, random_token};
use crate::domains::mail::models::{EmailVerification, VERIFICATION_TTL_MINUTES};
use crate::domains::users::actions::require_user;
use crate::domains::users::User;
use crate::kernel::{OutgoingEmail, ServerDeps};

const CODE_LENGTH: usize = 6;
const TEMP_PASSWORD_LENGTH: usize = 8;

pub fn generate_code() -> String {
    random_token(CODE_LENGTH).to_ascii_uppercase()
}

pub async fn send_verification(email: &str, deps: &ServerDeps) -> DomainResult<()> {
    require_email(email)?;

    let code = generate_code();
    EmailVerification::replace(email, &code, &deps.db_pool).await?;

    let message = OutgoingEmail::text(
        email.trim(),
        "Email Verification Code",
        format!(
            "Your verification code is: {}. Please enter this code within {} minutes.",
            code, VERIFICATION_TTL_MINUTES
        ),
    );
    deps.mailer.send(&message).await.map_err(|e| {
        error!(error = %e, email = %email, "Failed to send verification email");
        DomainError::Internal(e.context("Failed to send verification email. Please try again."))
    })?;

    info!(email = %email, "Verification code sent");
    Ok(())
}

/// Consume a code. Succeeds at most once per issued code.
pub async fn verify_code(email: &str, code: &str, deps: &ServerDeps) -> DomainResult<()> {
    let invalid = || DomainError::validation("Invalid or expired verification code");

    let verification = EmailVerification::find(email, &deps.db_pool)
        .await?
        .ok_or_else(invalid)?;

    if !verification.accepts(code, chrono::Utc::now()) {
        return Err(invalid());
    }

    EmailVerification::delete(email, &deps.db_pool).await?;
    info!(email = %email, "Email verified");
    Ok(())
}

/// Email a temporary password, then store it flagged for mandatory change.
pub async fn find_password(user_id: &str, email: &str, deps: &ServerDeps) -> DomainResult<()> {
    let user: User = require_user(user_id, &deps.db_pool).await?;
    if !user.email.eq_ignore_ascii_case(email.trim()) {
        return Err(DomainError::not_found("User", format!("{} / {}", user_id, email)));
    }

    let temp_password = random_token(TEMP_PASSWORD_LENGTH);
    let message = OutgoingEmail::text(
        user.email.clone(),
        "Password Reset Instructions",
        format!(
            "Your temporary password: {}\nPlease log in and change your password immediately.",
            temp_password
        ),
    );
    deps.mailer.send(&message).await.map_err(|e| {
        error!(error = %e, user_id = %user_id, "Failed to send password reset email");
        DomainError::Internal(e.context("Failed to send password reset email. Please try again."))
    })?;

    let password_hash = hash_password(&temp_password).await?;
    User::set_password(user.id, &password_hash, true, &deps.db_pool).await?;

    info!(user_id = %user_id, "Temporary password issued");
    Ok(())
}
