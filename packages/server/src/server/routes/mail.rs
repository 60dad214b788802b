//! `/mail/*` - verification codes and password recovery.

use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::domains::mail::actions;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::routes::users::{EmailRequest, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPasswordRequest {
    pub user_id: String,
    pub email: String,
}

pub async fn send_verification(
    Extension(state): Extension<AppState>,
    Json(request): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    actions::send_verification(&request.email, &state.deps).await?;
    Ok(MessageResponse::new("Verification code sent"))
}

pub async fn verify_code(
    Extension(state): Extension<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    actions::verify_code(&request.email, &request.code, &state.deps).await?;
    Ok(MessageResponse::new("Email verified"))
}

pub async fn find_password(
    Extension(state): Extension<AppState>,
    Json(request): Json<FindPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    actions::find_password(&request.user_id, &request.email, &state.deps).await?;
    Ok(MessageResponse::new("Temporary password sent"))
}
