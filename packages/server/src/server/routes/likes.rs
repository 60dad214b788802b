//! `/likes/*`

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::EventId;
use crate::domains::likes::actions;
use crate::server::app::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCount {
    pub likes_len: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub is_liked: bool,
}

pub async fn toggle_like(
    Extension(state): Extension<AppState>,
    Path(event_id): Path<EventId>,
    Json(request): Json<LikeRequest>,
) -> ApiResult<Json<LikeCount>> {
    let likes_len = actions::toggle_like(event_id, &request.user_id, state.pool()).await?;
    Ok(Json(LikeCount { likes_len }))
}

pub async fn is_liked(
    Extension(state): Extension<AppState>,
    Path(event_id): Path<EventId>,
    Query(query): Query<LikeRequest>,
) -> ApiResult<Json<LikeStatus>> {
    let is_liked = actions::is_liked(event_id, &query.user_id, state.pool()).await?;
    Ok(Json(LikeStatus { is_liked }))
}
