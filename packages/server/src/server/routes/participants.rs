//! `/participants/*` - joining events and host decisions.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{DomainError, EventId, ParticipantId};
use crate::domains::events::models::EventSummary;
use crate::domains::participants::actions::{self, JoinEventInput};
use crate::domains::participants::models::{Participant, ParticipantStatus};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::routes::users::MessageResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    pub event_id: EventId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequest {
    pub user_id: String,
    pub event_id: EventId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationStatus {
    pub is_participating: bool,
}

pub async fn join_event(
    Extension(state): Extension<AppState>,
    Json(input): Json<JoinEventInput>,
) -> ApiResult<(StatusCode, Json<Participant>)> {
    let participant = actions::join_event(input, state.pool()).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn update_status(
    Extension(state): Extension<AppState>,
    Path(participant_id): Path<ParticipantId>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Participant>> {
    let status: ParticipantStatus = request
        .status
        .parse()
        .map_err(|_| DomainError::validation(format!("Invalid status value: {}", request.status)))?;
    let participant =
        actions::update_status(participant_id, status, request.event_id, state.pool()).await?;
    Ok(Json(participant))
}

pub async fn cancel_participation(
    Extension(state): Extension<AppState>,
    Json(request): Json<ParticipationRequest>,
) -> ApiResult<Json<MessageResponse>> {
    actions::cancel_participation(&request.user_id, request.event_id, state.pool()).await?;
    Ok(MessageResponse::new("Participation canceled successfully."))
}

pub async fn check_participation(
    Extension(state): Extension<AppState>,
    Query(query): Query<ParticipationRequest>,
) -> ApiResult<Json<ParticipationStatus>> {
    let is_participating =
        actions::check_participation(query.event_id, &query.user_id, state.pool()).await?;
    Ok(Json(ParticipationStatus { is_participating }))
}

pub async fn participated_events(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<EventSummary>>> {
    Ok(Json(actions::participated_events(&user_id, state.pool()).await?))
}
