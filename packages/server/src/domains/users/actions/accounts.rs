//! Account lifecycle: sign-up, sign-in, profile reads and edits.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::common::validation::{require_email, require_image_url, require_non_blank};
use crate::common::{DomainError, DomainResult, UserId};
use crate::domains::auth::{hash_password, verify_password};
use crate::domains::events::models::Event;
use crate::domains::users::models::{NewUser, ProfileUpdate, User};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    pub user_id: String,
    pub email: String,
    pub password: String,
    pub username: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
}

/// What a user may see about themselves or another user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
    pub nationality: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub university: Option<String>,
    pub age: Option<i32>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let age = user.age();
        Self {
            id: user.id,
            user_id: user.user_id,
            email: user.email,
            username: user.username,
            profile_image: user.profile_image,
            phone_number: user.phone_number,
            nationality: user.nationality,
            dob: user.dob,
            gender: user.gender,
            university: user.university,
            age,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResult {
    pub access_token: String,
    pub password_change_required: bool,
}

/// Load a user by public handle or fail with NotFound.
pub async fn require_user(user_id: &str, pool: &PgPool) -> DomainResult<User> {
    User::find_by_user_id(user_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("User", user_id))
}

pub async fn sign_up(input: SignUpInput, pool: &PgPool) -> DomainResult<UserProfile> {
    require_non_blank("userId", &input.user_id)?;
    require_non_blank("username", &input.username)?;
    require_non_blank("password", &input.password)?;
    require_email(&input.email)?;

    if User::user_id_exists(&input.user_id, pool).await? {
        return Err(DomainError::conflict(format!(
            "User ID {} is already taken",
            input.user_id
        )));
    }
    if User::email_exists(&input.email, pool).await? {
        return Err(DomainError::conflict(format!(
            "Email {} is already registered",
            input.email
        )));
    }

    let password_hash = hash_password(&input.password).await?;
    let user = User::create(
        NewUser::builder()
            .user_id(input.user_id.trim())
            .email(input.email.trim())
            .username(input.username.trim())
            .password_hash(password_hash)
            .profile_image(input.profile_image)
            .phone_number(input.phone_number)
            .nationality(input.nationality)
            .dob(input.dob)
            .gender(input.gender)
            .university(input.university)
            .build(),
        pool,
    )
    .await?;

    info!(user_id = %user.user_id, "User signed up");
    Ok(user.into())
}

pub async fn sign_in(user_id: &str, password: &str, deps: &ServerDeps) -> DomainResult<SignInResult> {
    let invalid = || DomainError::unauthorized("Invalid user ID or password");

    let user = User::find_by_user_id(user_id, &deps.db_pool)
        .await?
        .ok_or_else(invalid)?;
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;

    if !verify_password(password, hash).await? {
        return Err(invalid());
    }

    let access_token = deps
        .jwt_service
        .create_token(user.id, &user.user_id, &user.email)?;

    info!(user_id = %user.user_id, "User signed in");
    Ok(SignInResult {
        access_token,
        password_change_required: user.password_change_required(Utc::now()),
    })
}

pub async fn get_user(user_id: &str, pool: &PgPool) -> DomainResult<UserProfile> {
    Ok(require_user(user_id, pool).await?.into())
}

/// Profile for the bearer of a verified token.
pub async fn current_user(id: UserId, pool: &PgPool) -> DomainResult<UserProfile> {
    User::find_by_id(id, pool)
        .await?
        .map(Into::into)
        .ok_or_else(|| DomainError::not_found("User", id))
}

pub async fn is_user_id_available(user_id: &str, pool: &PgPool) -> DomainResult<bool> {
    Ok(!User::user_id_exists(user_id, pool).await?)
}

pub async fn is_email_available(email: &str, pool: &PgPool) -> DomainResult<bool> {
    Ok(!User::email_exists(email, pool).await?)
}

pub async fn update_user(
    email: &str,
    update: ProfileUpdate,
    pool: &PgPool,
) -> DomainResult<UserProfile> {
    if let Some(username) = &update.username {
        require_non_blank("username", username)?;
    }
    User::update_profile_by_email(email, &update, pool)
        .await?
        .map(Into::into)
        .ok_or_else(|| DomainError::not_found("User", email))
}

/// Delete an account along with every event it hosts.
pub async fn delete_user(user_id: &str, pool: &PgPool) -> DomainResult<()> {
    let user = require_user(user_id, pool).await?;

    let mut tx = pool.begin().await?;
    let hosted = Event::ids_by_creator(user.id, &mut *tx).await?;
    for event_id in &hosted {
        Event::delete_cascade(*event_id, &mut *tx).await?;
    }
    User::delete(user.id, &mut *tx).await?;
    tx.commit().await?;

    info!(user_id = %user_id, hosted_events = hosted.len(), "User deleted");
    Ok(())
}

pub async fn find_username(email: &str, pool: &PgPool) -> DomainResult<String> {
    User::find_by_email(email, pool)
        .await?
        .map(|user| user.user_id)
        .ok_or_else(|| DomainError::not_found("User", email))
}

pub async fn update_password(user_id: &str, password: &str, pool: &PgPool) -> DomainResult<()> {
    require_non_blank("password", password)?;
    let user = require_user(user_id, pool).await?;

    let password_hash = hash_password(password).await?;
    User::set_password(user.id, &password_hash, false, pool).await?;

    info!(user_id = %user_id, "Password updated");
    Ok(())
}

pub async fn update_profile_image(user_id: &str, url: &str, pool: &PgPool) -> DomainResult<()> {
    require_image_url(url)?;
    let user = require_user(user_id, pool).await?;
    User::set_profile_image(user.id, url.trim(), pool).await?;
    Ok(())
}
