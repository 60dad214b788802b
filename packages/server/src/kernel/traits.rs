// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Which emails get sent, and when, is decided by the domains.
//
// Naming convention: Base* for trait names (e.g., BaseMailer)

use anyhow::Result;
use async_trait::async_trait;

/// A fully rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    /// Optional HTML alternative; plain text is always sent.
    pub html_body: Option<String>,
}

impl OutgoingEmail {
    pub fn text(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text_body: body.into(),
            html_body: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }
}

// =============================================================================
// Mail Trait (Infrastructure - delivery only)
// =============================================================================

#[async_trait]
pub trait BaseMailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}
