//! Integration tests for the notification outbox and its dispatcher.

mod common;

use common::{fixtures, TestHarness};
use events_core::domains::notifications::{
    dispatch_pending, notify, DispatcherConfig, Notification, NotificationDispatcher,
    NotificationMessage,
};
use events_core::domains::notifications::EventMailInfo;
use events_core::domains::participants::{join_event, update_status, JoinEventInput, ParticipantStatus};
use std::sync::atomic::Ordering;
use std::time::Duration;
use test_context::test_context;

async fn drain(ctx: &TestHarness) {
    loop {
        let report = dispatch_pending(&ctx.deps, 50).await.unwrap();
        if report.is_empty() {
            break;
        }
    }
}

// Delivery and failure share one test: the dispatcher claims every pending
// row in the database, so concurrent dispatch tests would steal each other's.
#[test_context(TestHarness)]
#[tokio::test]
async fn dispatcher_delivers_once_and_records_failures(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let guest = fixtures::create_user(&ctx.db_pool, "guest").await.unwrap();
    let event = fixtures::create_register_event(&ctx.db_pool, &host).await.unwrap();

    let pending = join_event(
        JoinEventInput {
            event_id: event.id,
            user_id: guest.user_id.clone(),
            answer: None,
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();

    drain(ctx).await;

    let host_rows = Notification::find_by_recipient(&host.email, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(host_rows.len(), 1);
    assert_eq!(host_rows[0].status, "sent");
    assert!(host_rows[0].sent_at.is_some());

    let host_mail = ctx.mailer.sent_to(&host.email);
    assert_eq!(host_mail.len(), 1);
    assert!(host_mail[0].text_body.contains(&event.name));
    assert!(host_mail[0].text_body.contains("guest"));

    // A second pass must not resend.
    drain(ctx).await;
    assert_eq!(ctx.mailer.sent_to(&host.email).len(), 1);

    ctx.mailer.set_failing(true);
    update_status(pending.id, ParticipantStatus::Approved, event.id, &ctx.db_pool)
        .await
        .unwrap();
    drain(ctx).await;

    let guest_rows = Notification::find_by_recipient(&guest.email, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(guest_rows.len(), 1);
    assert_eq!(guest_rows[0].status, "failed");
    assert_eq!(guest_rows[0].attempts, 1);
    assert!(guest_rows[0].last_error.is_some());

    // Failed rows are not retried.
    ctx.mailer.set_failing(false);
    drain(ctx).await;
    assert!(ctx.mailer.sent_to(&guest.email).is_empty());
    let guest_rows = Notification::find_by_recipient(&guest.email, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(guest_rows[0].status, "failed");

    // A batch mixing deliverable and unreadable rows settles every row.
    let first = fixtures::unique("first") + "@example.com";
    let broken = fixtures::unique("broken") + "@example.com";
    let last = fixtures::unique("last") + "@example.com";
    let deleted = |reason: &str| NotificationMessage::EventDeleted {
        guest_name: guest.username.clone(),
        event: EventMailInfo::from(&event),
        reason: reason.to_string(),
    };
    notify(&first, deleted("Rain"), &ctx.db_pool).await;
    sqlx::query(
        "INSERT INTO notifications (id, kind, recipient, payload) \
         VALUES (gen_random_uuid(), 'event_deleted', $1, '{\"kind\": \"event_deleted\"}'::jsonb)",
    )
    .bind(&broken)
    .execute(&ctx.db_pool)
    .await
    .unwrap();
    notify(&last, deleted("Snow"), &ctx.db_pool).await;

    drain(ctx).await;

    let stranded: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE status = 'pending' AND attempts > 0",
    )
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(stranded, 0);
    for (recipient, status) in [(&first, "sent"), (&broken, "failed"), (&last, "sent")] {
        let rows = Notification::find_by_recipient(recipient, &ctx.db_pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, status, "status for {}", recipient);
        assert_eq!(rows[0].attempts, 1);
    }
    let broken_rows = Notification::find_by_recipient(&broken, &ctx.db_pool)
        .await
        .unwrap();
    assert!(broken_rows[0].last_error.is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn dispatcher_stops_once_shutdown_is_requested(ctx: &TestHarness) {
    let dispatcher = NotificationDispatcher::new(
        ctx.deps.clone(),
        DispatcherConfig {
            poll_interval: Duration::from_secs(60),
            ..Default::default()
        },
    );
    dispatcher.shutdown_handle().store(true, Ordering::SeqCst);

    let stopped = tokio::time::timeout(Duration::from_secs(5), dispatcher.run()).await;

    assert!(matches!(stopped, Ok(Ok(()))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn notify_queues_the_rendered_kind(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let event = fixtures::create_open_event(&ctx.db_pool, &host).await.unwrap();

    notify(
        &host.email,
        NotificationMessage::EventDeleted {
            guest_name: host.username.clone(),
            event: EventMailInfo::from(&event),
            reason: "Venue closed".to_string(),
        },
        &ctx.db_pool,
    )
    .await;

    let rows = Notification::find_by_recipient(&host.email, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, "event_deleted");
    let message = rows[0].message().unwrap();
    assert!(matches!(message, NotificationMessage::EventDeleted { ref reason, .. } if reason == "Venue closed"));
}
