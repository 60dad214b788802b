//! Integration tests for event creation, listings and deletion.

mod common;

use common::{fixtures, TestHarness};
use events_core::common::DomainError;
use events_core::domains::chatrooms::{ChatRoom, RoomType};
use events_core::domains::events::{
    create_event, delete_event, events_by_host, get_event, get_event_for_pending, list_events,
    subscribe, Event, EventListing, SearchFilter,
};
use events_core::domains::likes::toggle_like;
use events_core::domains::notifications::Notification;
use events_core::domains::participants::{join_event, update_status, JoinEventInput, ParticipantStatus};
use events_core::domains::users::actions::delete_user;
use test_context::test_context;

async fn rooms_named(name: &str, pool: &sqlx::PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM chat_rooms WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn creating_an_event_opens_its_chat_room(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let mut input = fixtures::event_input(&host, "Register");
    input.images = vec![
        "https://cdn.example.com/a.jpg".to_string(),
        "https://cdn.example.com/b.jpg".to_string(),
    ];

    let event = create_event(input, &ctx.db_pool).await.unwrap();

    assert_eq!(event.created_by, host.id);
    assert_eq!(event.time.map(|t| t.to_string()).as_deref(), Some("14:30:00"));

    let room = ChatRoom::find_by_event(event.id, &ctx.db_pool)
        .await
        .unwrap()
        .expect("event room");
    assert_eq!(room.name, event.name);
    assert_eq!(room.room_type, RoomType::Event.to_string());
    assert!(ChatRoom::is_member(room.id, host.id, &ctx.db_pool).await.unwrap());

    let detail = get_event(event.id, &ctx.db_pool).await.unwrap();
    assert_eq!(detail.chat_room_id, Some(room.id));
    assert_eq!(detail.host.user_id, host.user_id);
    let urls: Vec<_> = detail.images.iter().map(|i| i.image_url.as_str()).collect();
    assert_eq!(urls, ["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.jpg"]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failed_image_insert_rolls_everything_back(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let mut input = fixtures::event_input(&host, "Register");
    input.images = vec![
        "https://cdn.example.com/ok.jpg".to_string(),
        "ftp://not-an-image".to_string(),
    ];
    let name = input.name.clone();

    let result = create_event(input, &ctx.db_pool).await;

    // The caller sees the error that aborted the insert, not a rollback error.
    match result {
        Err(DomainError::Validation(message)) => assert!(message.contains("ftp://not-an-image")),
        other => panic!("expected the image validation error, got {:?}", other),
    }
    assert_eq!(Event::count_by_creator(host.id, &ctx.db_pool).await.unwrap(), 0);
    assert_eq!(rooms_named(&name, &ctx.db_pool).await, 0);
    let participants: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM participants p JOIN events e ON e.id = p.event_id WHERE e.name = $1",
    )
    .bind(&name)
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(participants, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_hosts_cannot_create_events(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let mut input = fixtures::event_input(&host, "Register");
    input.user_id = fixtures::unique("ghost");
    let name = input.name.clone();

    let result = create_event(input, &ctx.db_pool).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
    assert_eq!(rooms_named(&name, &ctx.db_pool).await, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invalid_participant_bounds_are_rejected(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let mut input = fixtures::event_input(&host, "Register");
    input.min_participants = Some(20);
    input.max_participants = Some(5);

    let result = create_event(input, &ctx.db_pool).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn listings_include_new_events(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let event = fixtures::create_open_event(&ctx.db_pool, &host).await.unwrap();

    for listing in [EventListing::All, EventListing::Hot, EventListing::Upcoming] {
        let events = list_events(listing, &ctx.db_pool).await.unwrap();
        assert!(events.iter().any(|e| e.id == event.id));
    }

    let found = list_events(
        EventListing::Search(SearchFilter {
            query: Some(event.name.to_lowercase()),
            ..Default::default()
        }),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].created_by.user_id, host.user_id);

    let hosted = events_by_host(&host.user_id, &ctx.db_pool).await.unwrap();
    assert_eq!(hosted.len(), 1);
    assert!(events_by_host("nobody_at_all", &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn listing_counts_only_approved_participants(ctx: &TestHarness) {
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

    let public = get_event(event.id, &ctx.db_pool).await.unwrap();
    let for_host = get_event_for_pending(event.id, &ctx.db_pool).await.unwrap();
    assert!(public.participants.is_empty());
    assert_eq!(for_host.participants.len(), 1);
    assert_eq!(for_host.participants[0].user.user_id, guest.user_id);

    update_status(pending.id, ParticipantStatus::Approved, event.id, &ctx.db_pool)
        .await
        .unwrap();
    let summary = events_by_host(&host.user_id, &ctx.db_pool).await.unwrap();
    assert_eq!(summary[0].participants, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deleting_an_event_removes_everything_attached(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let guest = fixtures::create_user(&ctx.db_pool, "guest").await.unwrap();
    let event = fixtures::create_open_event(&ctx.db_pool, &host).await.unwrap();
    join_event(
        JoinEventInput {
            event_id: event.id,
            user_id: guest.user_id.clone(),
            answer: None,
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    toggle_like(event.id, &guest.user_id, &ctx.db_pool).await.unwrap();

    delete_event(event.id, None, &ctx.db_pool).await.unwrap();

    assert!(Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().is_none());
    assert!(ChatRoom::find_by_event(event.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());
    let leftovers: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM participants WHERE event_id = $1)
              + (SELECT COUNT(*) FROM likes WHERE event_id = $1)",
    )
    .bind(event.id)
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(leftovers, 0);
    assert!(Notification::find_by_recipient(&guest.email, &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());

    let again = delete_event(event.id, None, &ctx.db_pool).await;
    assert!(matches!(again, Err(DomainError::NotFound { .. })));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deleting_with_a_reason_tells_remaining_participants(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let kept = fixtures::create_user(&ctx.db_pool, "kept").await.unwrap();
    let turned_away = fixtures::create_user(&ctx.db_pool, "rejected").await.unwrap();
    let event = fixtures::create_register_event(&ctx.db_pool, &host).await.unwrap();

    for guest in [&kept, &turned_away] {
        join_event(
            JoinEventInput {
                event_id: event.id,
                user_id: guest.user_id.clone(),
                answer: None,
            },
            &ctx.db_pool,
        )
        .await
        .unwrap();
    }
    let detail = get_event_for_pending(event.id, &ctx.db_pool).await.unwrap();
    let rejected_id = detail
        .participants
        .iter()
        .find(|p| p.user.user_id == turned_away.user_id)
        .map(|p| p.participant_id)
        .unwrap();
    update_status(rejected_id, ParticipantStatus::Rejected, event.id, &ctx.db_pool)
        .await
        .unwrap();

    delete_event(event.id, Some("Heavy rain"), &ctx.db_pool)
        .await
        .unwrap();

    let kept_mail = Notification::find_by_recipient(&kept.email, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(kept_mail.len(), 1);
    assert_eq!(kept_mail[0].kind, "event_deleted");
    assert_eq!(kept_mail[0].payload["reason"], "Heavy rain");

    let rejected_mail = Notification::find_by_recipient(&turned_away.email, &ctx.db_pool)
        .await
        .unwrap();
    assert!(rejected_mail.iter().all(|n| n.kind != "event_deleted"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deleting_a_user_deletes_their_events(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let event = fixtures::create_open_event(&ctx.db_pool, &host).await.unwrap();

    delete_user(&host.user_id, &ctx.db_pool).await.unwrap();

    assert!(Event::find_by_id(event.id, &ctx.db_pool).await.unwrap().is_none());
    let missing = get_event(event.id, &ctx.db_pool).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn subscribing_twice_is_fine(ctx: &TestHarness) {
    let email = format!("{}@example.com", fixtures::unique("reader"));

    subscribe(&email, &ctx.db_pool).await.unwrap();
    subscribe(&email, &ctx.db_pool).await.unwrap();

    let invalid = subscribe("not-an-email", &ctx.db_pool).await;
    assert!(matches!(invalid, Err(DomainError::Validation(_))));
}
