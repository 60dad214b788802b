//! Test fixtures built on the public actions.
//!
//! Handles and emails carry a random suffix so tests can share one database.

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use events_core::domains::events::{create_event, CreateEventInput, Event};
use events_core::domains::users::actions::{sign_up, SignUpInput, UserProfile};
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct horse battery";

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn create_user(pool: &PgPool, name: &str) -> Result<UserProfile> {
    let handle = unique(name);
    let profile = sign_up(
        SignUpInput {
            user_id: handle.clone(),
            email: format!("{}@example.com", handle),
            password: TEST_PASSWORD.to_string(),
            username: name.to_string(),
            profile_image: None,
            phone_number: None,
            nationality: None,
            dob: None,
            gender: None,
            university: None,
        },
        pool,
    )
    .await?;
    Ok(profile)
}

pub fn days_from_today(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

pub fn event_input(host: &UserProfile, event_type: &str) -> CreateEventInput {
    CreateEventInput {
        user_id: host.user_id.clone(),
        name: unique("Picnic"),
        category: Some("Outdoor".to_string()),
        event_type: Some(event_type.to_string()),
        location: Some("Han River".to_string()),
        date: Some(days_from_today(7)),
        time: Some("14:30".to_string()),
        max_participants: Some(10),
        min_participants: Some(2),
        question: Some("Why do you want to join?".to_string()),
        ..Default::default()
    }
}

/// An event that needs host approval to join.
pub async fn create_register_event(pool: &PgPool, host: &UserProfile) -> Result<Event> {
    Ok(create_event(event_input(host, "Register"), pool).await?)
}

/// An event anyone can join straight away.
pub async fn create_open_event(pool: &PgPool, host: &UserProfile) -> Result<Event> {
    Ok(create_event(event_input(host, "FirstCome"), pool).await?)
}
