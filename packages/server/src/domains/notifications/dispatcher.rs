//! Background delivery of queued notifications.
//!
//! ```text
//! NotificationDispatcher
//!     │
//!     ├─► claim pending rows (one claim per row)
//!     ├─► render + send via BaseMailer
//!     └─► mark sent / failed (no retries)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use super::models::Notification;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn is_empty(&self) -> bool {
        self.sent == 0 && self.failed == 0
    }
}

/// Deliver one batch of pending notifications.
pub async fn dispatch_pending(deps: &ServerDeps, batch_size: i64) -> Result<DispatchReport> {
    let claimed = Notification::claim_pending(batch_size, &deps.db_pool).await?;
    let mut report = DispatchReport::default();

    for notification in claimed {
        let outcome = match notification.message() {
            Ok(message) => {
                let email = message.render(&notification.recipient, &deps.frontend_url);
                deps.mailer.send(&email).await
            }
            Err(e) => Err(e),
        };

        // Claimed rows are never reclaimed; one failed status write must not
        // strand the rest of the batch.
        match outcome {
            Ok(()) => {
                debug!(notification_id = %notification.id, kind = %notification.kind, "notification sent");
                report.sent += 1;
                if let Err(e) = Notification::mark_sent(notification.id, &deps.db_pool).await {
                    error!(notification_id = %notification.id, error = %e, "failed to mark notification sent");
                }
            }
            Err(e) => {
                warn!(
                    notification_id = %notification.id,
                    kind = %notification.kind,
                    error = %e,
                    "notification delivery failed"
                );
                report.failed += 1;
                if let Err(mark_err) =
                    Notification::mark_failed(notification.id, &e.to_string(), &deps.db_pool).await
                {
                    error!(notification_id = %notification.id, error = %mark_err, "failed to mark notification failed");
                }
            }
        }
    }

    Ok(report)
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub batch_size: i64,
    /// How long to wait when the outbox is empty
    pub poll_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            poll_interval: Duration::from_secs(5),
        }
    }
}

pub struct NotificationDispatcher {
    deps: Arc<ServerDeps>,
    config: DispatcherConfig,
    shutdown: Arc<AtomicBool>,
}

impl NotificationDispatcher {
    pub fn new(deps: Arc<ServerDeps>, config: DispatcherConfig) -> Self {
        Self {
            deps,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set to `true` to stop the loop after the current batch.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub async fn run(self) -> Result<()> {
        info!(
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "notification dispatcher starting"
        );

        while !self.shutdown.load(Ordering::SeqCst) {
            match dispatch_pending(&self.deps, self.config.batch_size).await {
                Ok(report) if report.is_empty() => {
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                Ok(report) => {
                    info!(sent = report.sent, failed = report.failed, "notification batch done");
                }
                Err(e) => {
                    error!(error = %e, "notification dispatch failed");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        info!("notification dispatcher stopped");
        Ok(())
    }
}
