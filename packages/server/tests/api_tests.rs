//! HTTP-level tests: routing, status codes and error bodies.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{fixtures, TestHarness};
use serde_json::{json, Value};
use test_context::test_context;
use tower::ServiceExt;

async fn send(ctx: &TestHarness, request: Request<Body>) -> (StatusCode, Value) {
    let response = ctx.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_the_database(ctx: &TestHarness) {
    let (status, body) = send(ctx, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn sign_up_sign_in_and_me(ctx: &TestHarness) {
    let handle = fixtures::unique("mina");
    let (status, created) = send(
        ctx,
        json_request(
            Method::POST,
            "/user/signUp",
            json!({
                "userId": handle,
                "email": format!("{}@example.com", handle),
                "password": "hunter22",
                "username": "Mina"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userId"], handle.as_str());
    assert!(created.get("passwordHash").is_none());

    let (status, _) = send(
        ctx,
        json_request(
            Method::POST,
            "/user/signUp",
            json!({
                "userId": handle,
                "email": "other@example.com",
                "password": "hunter22",
                "username": "Mina"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, denied) = send(
        ctx,
        json_request(
            Method::POST,
            "/user/signIn",
            json!({ "userId": handle, "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(denied["code"], "UNAUTHORIZED");

    let (status, signed_in) = send(
        ctx,
        json_request(
            Method::POST,
            "/user/signIn",
            json!({ "userId": handle, "password": "hunter22" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = signed_in["accessToken"].as_str().unwrap().to_string();

    let (status, me) = send(
        ctx,
        Request::builder()
            .uri("/user/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["userId"], handle.as_str());

    let (status, anonymous) = send(ctx, get("/user/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous["code"], "UNAUTHORIZED");

    let (_, availability) = send(ctx, get(&format!("/user/isUserId/{}", handle))).await;
    assert_eq!(availability["available"], false);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn event_lifecycle_over_http(ctx: &TestHarness) {
    let host = fixtures::create_user(&ctx.db_pool, "host").await.unwrap();
    let guest = fixtures::create_user(&ctx.db_pool, "guest").await.unwrap();

    let (status, created) = send(
        ctx,
        json_request(
            Method::POST,
            "/events/submit",
            json!({
                "userId": host.user_id,
                "name": "Board games night",
                "type": "Register",
                "category": "Games",
                "date": fixtures::days_from_today(3),
                "time": "19:00",
                "maxParticipants": 6
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    let event_id = created["event"]["id"].as_str().unwrap().to_string();

    let (status, joined) = send(
        ctx,
        json_request(
            Method::POST,
            "/participants/createParticipant",
            json!({ "eventId": event_id, "userId": guest.user_id, "answer": "I bring snacks" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(joined["status"], "Pending");

    let (status, conflict) = send(
        ctx,
        json_request(
            Method::POST,
            "/participants/createParticipant",
            json!({ "eventId": event_id, "userId": guest.user_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["code"], "CONFLICT");

    let (status, approved) = send(
        ctx,
        json_request(
            Method::PATCH,
            &format!("/participants/{}/status", joined["id"].as_str().unwrap()),
            json!({ "status": "Approved", "eventId": event_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "Approved");

    let (_, check) = send(
        ctx,
        get(&format!(
            "/participants/checkParticipation?eventId={}&userId={}",
            event_id, guest.user_id
        )),
    )
    .await;
    assert_eq!(check["isParticipating"], true);

    let (_, liked) = send(
        ctx,
        json_request(
            Method::POST,
            &format!("/likes/{}/like", event_id),
            json!({ "userId": guest.user_id }),
        ),
    )
    .await;
    assert_eq!(liked["likesLen"], 1);

    let (status, detail) = send(ctx, get(&format!("/events/getEvents/{}", event_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Board games night");
    assert_eq!(detail["participants"].as_array().unwrap().len(), 1);
    assert_eq!(detail["likes"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        ctx,
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/events/{}?reason=Cancelled", event_id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert!(status.is_success());

    let (status, missing) = send(ctx, get(&format!("/events/getEvents/{}", event_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["code"], "NOT_FOUND");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn listing_requires_a_known_fetch_type(ctx: &TestHarness) {
    let (status, body) = send(ctx, get("/events?fetchType=sideways")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(ctx, get("/events?fetchType=all")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());

    let (status, _) = send(ctx, get("/events/sorted?sortBy=sideways")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn chat_rooms_over_http(ctx: &TestHarness) {
    let name = fixtures::unique("Lounge");
    let (status, room) = send(
        ctx,
        json_request(
            Method::POST,
            "/chatrooms",
            json!({ "name": name, "type": "GENERAL" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = room["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        ctx,
        json_request(
            Method::POST,
            "/chatmessages",
            json!({ "roomId": room_id, "content": "hello" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, history) = send(ctx, get(&format!("/chatmessages/room/{}", room_id))).await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (_, rooms) = send(ctx, get("/chatrooms?type=general")).await;
    assert!(rooms
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == room_id.as_str()));
}
