//! Server dependencies shared by every domain action.
//!
//! Constructed once in `main` (or by `TestDependencies` in tests) and passed
//! explicitly; external services sit behind traits so tests can swap them.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{stream_hub::StreamHub, BaseMailer};

#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub mailer: Arc<dyn BaseMailer>,
    /// In-process pub/sub for the chat socket
    pub stream_hub: StreamHub,
    pub jwt_service: Arc<JwtService>,
    /// Base URL for links embedded in outgoing email
    pub frontend_url: String,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        mailer: Arc<dyn BaseMailer>,
        stream_hub: StreamHub,
        jwt_service: Arc<JwtService>,
        frontend_url: String,
    ) -> Self {
        Self {
            db_pool,
            mailer,
            stream_hub,
            jwt_service,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }
}
