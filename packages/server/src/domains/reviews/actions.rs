use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::common::validation::require_image_url;
use crate::common::{DomainError, DomainResult, EventId, ReviewId};
use crate::domains::events::models::Event;
use crate::domains::reviews::models::{Review, ReviewImage};
use crate::domains::users::actions::require_user;

pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub user_id: String,
    pub event_id: EventId,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HostRating {
    pub average: f64,
    pub count: i64,
}

/// Ratings run from 0 to 5 in steps of one tenth.
pub fn is_valid_rating(rating: f64) -> bool {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return false;
    }
    let tenths = rating * 10.0;
    (tenths - tenths.round()).abs() < 1e-9
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub async fn create_review(input: CreateReviewInput, pool: &PgPool) -> DomainResult<ReviewView> {
    if !is_valid_rating(input.rating) {
        return Err(DomainError::validation(
            "Rating must be between 0 and 5 with at most one decimal place",
        ));
    }
    for url in &input.image_urls {
        require_image_url(url)?;
    }

    let event = Event::find_by_id(input.event_id, pool)
        .await?
        .ok_or_else(|| DomainError::not_found("Event", input.event_id))?;
    let user = require_user(&input.user_id, pool).await?;

    let mut tx = pool.begin().await?;
    let review = Review::create(
        event.id,
        user.id,
        input.rating,
        input.comment.as_deref(),
        &mut *tx,
    )
    .await?;
    let mut image_urls = Vec::with_capacity(input.image_urls.len());
    for url in &input.image_urls {
        let image = ReviewImage::create(review.id, url.trim(), &mut *tx).await?;
        image_urls.push(image.image_url);
    }
    tx.commit().await?;

    info!(review_id = %review.id, event_id = %event.id, rating = review.rating, "Review created");
    Ok(ReviewView { review, image_urls })
}

async fn with_images(reviews: Vec<Review>, pool: &PgPool) -> DomainResult<Vec<ReviewView>> {
    let ids: Vec<ReviewId> = reviews.iter().map(|r| r.id).collect();
    let mut images: HashMap<ReviewId, Vec<String>> = HashMap::new();
    for image in ReviewImage::find_by_reviews(&ids, pool).await? {
        images.entry(image.review_id).or_default().push(image.image_url);
    }

    Ok(reviews
        .into_iter()
        .map(|review| ReviewView {
            image_urls: images.remove(&review.id).unwrap_or_default(),
            review,
        })
        .collect())
}

pub async fn reviews_for_event(event_id: EventId, pool: &PgPool) -> DomainResult<Vec<ReviewView>> {
    let reviews = Review::find_by_event(event_id, pool).await?;
    with_images(reviews, pool).await
}

pub async fn reviews_by_user(user_id: &str, pool: &PgPool) -> DomainResult<Vec<ReviewView>> {
    let user = require_user(user_id, pool).await?;
    let reviews = Review::find_by_user(user.id, pool).await?;
    with_images(reviews, pool).await
}

/// Average rating over every review of every event the user hosts.
pub async fn host_rating(user_id: &str, pool: &PgPool) -> DomainResult<HostRating> {
    let host = require_user(user_id, pool).await?;
    let aggregate = Review::aggregate_for_host(host.id, pool).await?;

    Ok(HostRating {
        average: aggregate.average.map(round_to_tenth).unwrap_or(0.0),
        count: aggregate.count,
    })
}
