//! `/events/*` - creation, listings, detail pages and deletion.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{DomainError, EventId};
use crate::domains::events::actions::{
    self, CreateEventInput, EventDetail, EventListing, ListEventsQuery, SortBy,
};
use crate::domains::events::models::{Event, EventSummary};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::routes::users::{EmailRequest, MessageResponse};

#[derive(Debug, Serialize)]
pub struct CreatedEvent {
    pub success: bool,
    pub event: Event,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortedQuery {
    pub sort_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteEventQuery {
    pub reason: Option<String>,
}

pub async fn create_event(
    Extension(state): Extension<AppState>,
    Json(input): Json<CreateEventInput>,
) -> ApiResult<(StatusCode, Json<CreatedEvent>)> {
    let event = actions::create_event(input, state.pool()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedEvent {
            success: true,
            event,
        }),
    ))
}

pub async fn list_events(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<Json<Vec<EventSummary>>> {
    let listing = EventListing::from_query(query)?;
    Ok(Json(actions::list_events(listing, state.pool()).await?))
}

pub async fn sorted_events(
    Extension(state): Extension<AppState>,
    Query(query): Query<SortedQuery>,
) -> ApiResult<Json<Vec<EventSummary>>> {
    let sort_by: SortBy = query
        .sort_by
        .as_deref()
        .ok_or_else(|| DomainError::validation("sortBy is required"))?
        .parse()?;
    Ok(Json(actions::sorted_events(sort_by, state.pool()).await?))
}

pub async fn get_event(
    Extension(state): Extension<AppState>,
    Path(event_id): Path<EventId>,
) -> ApiResult<Json<EventDetail>> {
    Ok(Json(actions::get_event(event_id, state.pool()).await?))
}

pub async fn get_event_for_pending(
    Extension(state): Extension<AppState>,
    Path(event_id): Path<EventId>,
) -> ApiResult<Json<EventDetail>> {
    Ok(Json(actions::get_event_for_pending(event_id, state.pool()).await?))
}

pub async fn events_by_host(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<EventSummary>>> {
    Ok(Json(actions::events_by_host(&user_id, state.pool()).await?))
}

pub async fn liked_events(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<EventSummary>>> {
    Ok(Json(actions::liked_events(&user_id, state.pool()).await?))
}

pub async fn subscribe(
    Extension(state): Extension<AppState>,
    Json(request): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    actions::subscribe(&request.email, state.pool()).await?;
    Ok(MessageResponse::new("Subscribed"))
}

pub async fn delete_event(
    Extension(state): Extension<AppState>,
    Path(event_id): Path<EventId>,
    Query(query): Query<DeleteEventQuery>,
) -> ApiResult<Json<MessageResponse>> {
    actions::delete_event(event_id, query.reason.as_deref(), state.pool()).await?;
    Ok(MessageResponse::new("Event successfully deleted"))
}
