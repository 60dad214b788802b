//! Mail delivery backends.
//!
//! `SmtpMailer` relays through an authenticated SMTP server with STARTTLS.
//! `LogMailer` only logs, and is used when no SMTP credentials are configured.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::traits::{BaseMailer, OutgoingEmail};
use crate::config::SmtpConfig;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("Invalid SMTP relay {}", config.host))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = format!("{} <{}>", config.from_name, config.username)
            .parse::<Mailbox>()
            .context("Invalid sender address")?;

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        let to = email
            .to
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid recipient address {}", email.to))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone());

        let message = match &email.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                html.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.text_body.clone()),
        };

        message.context("Failed to build email")
    }
}

#[async_trait]
impl BaseMailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .with_context(|| format!("Failed to send email to {}", email.to))?;

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Mailer for local development: nothing leaves the process.
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl BaseMailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        info!(to = %email.to, subject = %email.subject, "Email (not delivered, SMTP disabled)");
        debug!(body = %email.text_body, "Email body");
        Ok(())
    }
}
