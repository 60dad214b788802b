// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseMailer, OutgoingEmail, ServerDeps, StreamHub};
use crate::domains::auth::JwtService;

// =============================================================================
// Mock Mailer
// =============================================================================

/// Records every email instead of sending it. Can be switched into a failing
/// mode to exercise best-effort delivery paths.
#[derive(Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    failing: Arc<AtomicBool>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mailer = Self::new();
        mailer.set_failing(true);
        mailer
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<OutgoingEmail> {
        self.sent()
            .into_iter()
            .filter(|email| email.to == address)
            .collect()
    }
}

#[async_trait]
impl BaseMailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mock mailer configured to fail");
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "test_issuer";

pub struct TestDependencies {
    pub mailer: MockMailer,
    pub stream_hub: StreamHub,
    pub frontend_url: String,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            mailer: MockMailer::new(),
            stream_hub: StreamHub::new(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }

    pub fn with_mailer(mut self, mailer: MockMailer) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn into_server_deps(self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            Arc::new(self.mailer),
            self.stream_hub,
            Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            self.frontend_url,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_mailer_records_sent_mail() {
        let mailer = MockMailer::new();
        mailer
            .send(&OutgoingEmail::text("a@example.com", "Hi", "body"))
            .await
            .unwrap();

        assert_eq!(mailer.sent_to("a@example.com").len(), 1);
        assert!(mailer.sent_to("b@example.com").is_empty());
    }

    #[tokio::test]
    async fn failing_mock_mailer_records_nothing() {
        let mailer = MockMailer::failing();
        let result = mailer
            .send(&OutgoingEmail::text("a@example.com", "Hi", "body"))
            .await;

        assert!(result.is_err());
        assert!(mailer.sent().is_empty());
    }
}
