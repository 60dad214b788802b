//! `/reviews/*`

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};

use crate::common::EventId;
use crate::domains::reviews::actions::{self, CreateReviewInput, HostRating, ReviewView};
use crate::server::app::AppState;
use crate::server::error::ApiResult;

pub async fn create_review(
    Extension(state): Extension<AppState>,
    Json(input): Json<CreateReviewInput>,
) -> ApiResult<(StatusCode, Json<ReviewView>)> {
    let review = actions::create_review(input, state.pool()).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn reviews_for_event(
    Extension(state): Extension<AppState>,
    Path(event_id): Path<EventId>,
) -> ApiResult<Json<Vec<ReviewView>>> {
    Ok(Json(actions::reviews_for_event(event_id, state.pool()).await?))
}

pub async fn reviews_by_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<ReviewView>>> {
    Ok(Json(actions::reviews_by_user(&user_id, state.pool()).await?))
}

pub async fn host_rating(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<HostRating>> {
    Ok(Json(actions::host_rating(&user_id, state.pool()).await?))
}
