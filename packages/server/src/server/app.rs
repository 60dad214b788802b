//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    chat, events, health_handler, likes, mail, participants, reviews, socket_handler, users,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }

    pub fn pool(&self) -> &PgPool {
        &self.deps.db_pool
    }
}

fn user_routes() -> Router {
    Router::new()
        .route("/signUp", post(users::sign_up))
        .route("/signIn", post(users::sign_in))
        .route("/me", get(users::me))
        .route("/isUserId/:userId", get(users::is_user_id_available))
        .route("/isEmail/:email", get(users::is_email_available))
        .route("/getUser/:userId", get(users::get_user))
        .route("/updateUser", post(users::update_user))
        .route("/delete/:userId", delete(users::delete_user))
        .route("/findUsername", post(users::find_username))
        .route("/updatePassword", patch(users::update_password))
        .route("/profileImage", patch(users::update_profile_image))
}

fn mail_routes() -> Router {
    Router::new()
        .route("/sendVerification", post(mail::send_verification))
        .route("/verifyCode", post(mail::verify_code))
        .route("/findPassword", post(mail::find_password))
}

fn event_routes() -> Router {
    Router::new()
        .route("/", get(events::list_events))
        .route("/submit", post(events::create_event))
        .route("/sorted", get(events::sorted_events))
        .route("/getEvents/:eventId", get(events::get_event))
        .route("/getEventForPending/:eventId", get(events::get_event_for_pending))
        .route("/getEventsByHostId/:userId", get(events::events_by_host))
        .route("/getLikedEvent/:userId", get(events::liked_events))
        .route("/subscribe", post(events::subscribe))
        .route("/:eventId", delete(events::delete_event))
}

fn participant_routes() -> Router {
    Router::new()
        .route("/createParticipant", post(participants::join_event))
        .route("/:id/status", patch(participants::update_status))
        .route("/cancelParticipation", post(participants::cancel_participation))
        .route("/checkParticipation", get(participants::check_participation))
        .route("/getParticipatedEvent/:userId", get(participants::participated_events))
}

fn like_routes() -> Router {
    Router::new()
        .route("/:eventId/like", post(likes::toggle_like))
        .route("/:eventId/isLiked", get(likes::is_liked))
}

fn chat_room_routes() -> Router {
    Router::new()
        .route("/", get(chat::list_rooms).post(chat::create_room))
        .route(
            "/:id",
            get(chat::get_room)
                .put(chat::update_room)
                .delete(chat::delete_room),
        )
}

fn chat_message_routes() -> Router {
    Router::new()
        .route("/", post(chat::send_message))
        .route("/room/:roomId", get(chat::messages_for_room))
        .route(
            "/:id",
            patch(chat::update_message).delete(chat::delete_message),
        )
}

fn review_routes() -> Router {
    Router::new()
        .route("/submit", post(reviews::create_review))
        .route("/event/:eventId", get(reviews::reviews_for_event))
        .route("/user/:userId", get(reviews::reviews_by_user))
        .route("/host/:userId/rating", get(reviews::host_rating))
}

/// All REST and socket routes with auth, state and tracing, but no rate
/// limiting or CORS. Tests drive this directly.
pub fn build_router(deps: Arc<ServerDeps>) -> Router {
    let jwt_service = deps.jwt_service.clone();
    let state = AppState::new(deps);

    Router::new()
        .route("/health", get(health_handler))
        .route("/socket", get(socket_handler))
        .nest("/user", user_routes())
        .nest("/mail", mail_routes())
        .nest("/events", event_routes())
        .nest("/participants", participant_routes())
        .nest("/likes", like_routes())
        .nest("/chatrooms", chat_room_routes())
        .nest("/chatmessages", chat_message_routes())
        .nest("/reviews", review_routes())
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// Build the Axum application: the router plus per-IP rate limiting and
/// CORS for the frontend origin.
pub fn build_app(deps: Arc<ServerDeps>) -> Result<Router> {
    let origin = deps
        .frontend_url
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid FRONTEND_URL: {}", deps.frontend_url))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // 10 requests per second per IP, bursts up to 20
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    Ok(build_router(deps).layer(rate_limit_layer).layer(cors))
}
