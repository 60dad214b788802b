use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::UserId;

/// Passwords older than this must be changed at next sign-in.
pub const PASSWORD_MAX_AGE_DAYS: i64 = 180;

/// User account row. Never serialized directly: it carries the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub user_id: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub username: String,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
    pub nationality: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub university: Option<String>,
    pub password_last_changed: DateTime<Utc>,
    pub password_reset: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewUser {
    pub user_id: String,
    pub email: String,
    pub username: String,
    #[builder(default, setter(strip_option))]
    pub password_hash: Option<String>,
    #[builder(default)]
    pub profile_image: Option<String>,
    #[builder(default)]
    pub phone_number: Option<String>,
    #[builder(default)]
    pub nationality: Option<String>,
    #[builder(default)]
    pub dob: Option<NaiveDate>,
    #[builder(default)]
    pub gender: Option<String>,
    #[builder(default)]
    pub university: Option<String>,
}

/// Editable profile fields; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub nationality: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub university: Option<String>,
    pub profile_image: Option<String>,
}

/// Public projection of a user, nested inside events, reviews and rooms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub user_id: String,
    pub username: String,
    pub profile_image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

impl User {
    /// Full years between `dob` and `today`.
    pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
        let mut age = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        age
    }

    pub fn age(&self) -> Option<i32> {
        self.dob.map(|dob| Self::age_on(dob, Utc::now().date_naive()))
    }

    /// Reset passwords and passwords older than [`PASSWORD_MAX_AGE_DAYS`]
    /// must be replaced.
    pub fn password_change_required(&self, now: DateTime<Utc>) -> bool {
        self.password_reset
            || now - self.password_last_changed > chrono::Duration::days(PASSWORD_MAX_AGE_DAYS)
    }

    pub async fn find_by_id<'e>(id: UserId, db: impl PgExecutor<'e>) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Look up by public handle.
    pub async fn find_by_user_id<'e>(
        user_id: &str,
        db: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn user_id_exists(user_id: &str, pool: &PgPool) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    pub async fn email_exists(email: &str, pool: &PgPool) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    pub async fn create(new_user: NewUser, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, user_id, email, password_hash, username, profile_image,
                phone_number, nationality, dob, gender, university
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(UserId::new())
        .bind(new_user.user_id)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.username)
        .bind(new_user.profile_image)
        .bind(new_user.phone_number)
        .bind(new_user.nationality)
        .bind(new_user.dob)
        .bind(new_user.gender)
        .bind(new_user.university)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    /// Apply a profile update keyed by email. Returns `None` when no user matches.
    pub async fn update_profile_by_email(
        email: &str,
        update: &ProfileUpdate,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                phone_number = COALESCE($3, phone_number),
                nationality = COALESCE($4, nationality),
                dob = COALESCE($5, dob),
                gender = COALESCE($6, gender),
                university = COALESCE($7, university),
                profile_image = COALESCE($8, profile_image),
                updated_at = NOW()
            WHERE lower(email) = lower($1)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(&update.username)
        .bind(&update.phone_number)
        .bind(&update.nationality)
        .bind(update.dob)
        .bind(&update.gender)
        .bind(&update.university)
        .bind(&update.profile_image)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Store a new hash. `reset` marks a temporary password that must be
    /// changed at next sign-in.
    pub async fn set_password(
        id: UserId,
        password_hash: &str,
        reset: bool,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, password_reset = $3,
                password_last_changed = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(reset)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_profile_image(id: UserId, url: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET profile_image = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete<'e>(id: UserId, db: impl PgExecutor<'e>) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
