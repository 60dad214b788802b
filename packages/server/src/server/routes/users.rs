//! `/user/*` - accounts and profiles.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::DomainError;
use crate::domains::users::actions::{self, SignInResult, SignUpInput, UserProfile};
use crate::domains::users::ProfileUpdate;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: String,
    #[serde(flatten)]
    pub update: ProfileUpdate,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageRequest {
    pub user_id: String,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct Availability {
    pub available: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameResponse {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

pub async fn sign_up(
    Extension(state): Extension<AppState>,
    Json(input): Json<SignUpInput>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let user = actions::sign_up(input, state.pool()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn sign_in(
    Extension(state): Extension<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<SignInResult>> {
    let result = actions::sign_in(&request.user_id, &request.password, &state.deps).await?;
    Ok(Json(result))
}

pub async fn me(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> ApiResult<Json<UserProfile>> {
    let Some(Extension(auth)) = auth else {
        return Err(DomainError::unauthorized("Authentication required").into());
    };
    Ok(Json(actions::current_user(auth.id, state.pool()).await?))
}

pub async fn is_user_id_available(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Availability>> {
    let available = actions::is_user_id_available(&user_id, state.pool()).await?;
    Ok(Json(Availability { available }))
}

pub async fn is_email_available(
    Extension(state): Extension<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Availability>> {
    let available = actions::is_email_available(&email, state.pool()).await?;
    Ok(Json(Availability { available }))
}

pub async fn get_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(actions::get_user(&user_id, state.pool()).await?))
}

pub async fn update_user(
    Extension(state): Extension<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    let user = actions::update_user(&request.email, request.update, state.pool()).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    actions::delete_user(&user_id, state.pool()).await?;
    Ok(MessageResponse::new("User deleted"))
}

pub async fn find_username(
    Extension(state): Extension<AppState>,
    Json(request): Json<EmailRequest>,
) -> ApiResult<Json<UsernameResponse>> {
    let user_id = actions::find_username(&request.email, state.pool()).await?;
    Ok(Json(UsernameResponse { user_id }))
}

pub async fn update_password(
    Extension(state): Extension<AppState>,
    Json(request): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    actions::update_password(&request.user_id, &request.password, state.pool()).await?;
    Ok(MessageResponse::new("Password updated"))
}

pub async fn update_profile_image(
    Extension(state): Extension<AppState>,
    Json(request): Json<ProfileImageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    actions::update_profile_image(&request.user_id, &request.image_url, state.pool()).await?;
    Ok(MessageResponse::new("Profile image updated"))
}
