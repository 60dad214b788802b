//! Integration tests for accounts, mail verification and recovery.

mod common;

use common::{fixtures, TestHarness};
use events_core::common::DomainError;
use events_core::domains::mail::actions::{find_password, send_verification, verify_code};
use events_core::domains::mail::models::EmailVerification;
use events_core::domains::users::actions::{
    find_username, get_user, is_email_available, is_user_id_available, sign_in,
    update_password, update_profile_image, update_user,
};
use events_core::domains::users::ProfileUpdate;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn sign_in_issues_a_verifiable_token(ctx: &TestHarness) {
    let user = fixtures::create_user(&ctx.db_pool, "mina").await.unwrap();

    let result = sign_in(&user.user_id, fixtures::TEST_PASSWORD, &ctx.deps)
        .await
        .unwrap();

    assert!(!result.password_change_required);
    let claims = ctx.deps.jwt_service.verify_token(&result.access_token).unwrap();
    assert_eq!(claims.uid, user.id);
    assert_eq!(claims.sub, user.user_id);

    let wrong = sign_in(&user.user_id, "nope", &ctx.deps).await;
    assert!(matches!(wrong, Err(DomainError::Unauthorized(_))));
    let unknown = sign_in("nobody_at_all", "nope", &ctx.deps).await;
    assert!(matches!(unknown, Err(DomainError::Unauthorized(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn availability_reflects_existing_accounts(ctx: &TestHarness) {
    let user = fixtures::create_user(&ctx.db_pool, "mina").await.unwrap();

    assert!(!is_user_id_available(&user.user_id, &ctx.db_pool).await.unwrap());
    assert!(!is_email_available(&user.email, &ctx.db_pool).await.unwrap());
    assert!(is_user_id_available(&fixtures::unique("free"), &ctx.db_pool)
        .await
        .unwrap());
    assert_eq!(
        find_username(&user.email, &ctx.db_pool).await.unwrap(),
        user.user_id
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn profiles_can_be_edited(ctx: &TestHarness) {
    let user = fixtures::create_user(&ctx.db_pool, "mina").await.unwrap();

    let updated = update_user(
        &user.email,
        ProfileUpdate {
            username: Some("Mina K".to_string()),
            university: Some("SNU".to_string()),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(updated.username, "Mina K");
    assert_eq!(updated.university.as_deref(), Some("SNU"));

    update_profile_image(&user.user_id, "https://cdn.example.com/me.png", &ctx.db_pool)
        .await
        .unwrap();
    let profile = get_user(&user.user_id, &ctx.db_pool).await.unwrap();
    assert_eq!(
        profile.profile_image.as_deref(),
        Some("https://cdn.example.com/me.png")
    );

    let bad_image = update_profile_image(&user.user_id, "me.png", &ctx.db_pool).await;
    assert!(matches!(bad_image, Err(DomainError::Validation(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn verification_codes_work_once(ctx: &TestHarness) {
    let email = format!("{}@example.com", fixtures::unique("new"));

    send_verification(&email, &ctx.deps).await.unwrap();

    let sent = ctx.mailer.sent_to(&email);
    assert_eq!(sent.len(), 1);
    let code = EmailVerification::find(&email, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap()
        .code;
    assert!(sent[0].text_body.contains(&code));

    let wrong = verify_code(&email, "WRONG1", &ctx.deps).await;
    assert!(matches!(wrong, Err(DomainError::Validation(_))));

    verify_code(&email, &code, &ctx.deps).await.unwrap();
    let reused = verify_code(&email, &code, &ctx.deps).await;
    assert!(matches!(reused, Err(DomainError::Validation(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn password_recovery_forces_a_change(ctx: &TestHarness) {
    let user = fixtures::create_user(&ctx.db_pool, "mina").await.unwrap();

    find_password(&user.user_id, &user.email, &ctx.deps)
        .await
        .unwrap();

    let sent = ctx.mailer.sent_to(&user.email);
    assert_eq!(sent.len(), 1);
    let temp_password = sent[0]
        .text_body
        .lines()
        .find_map(|line| line.strip_prefix("Your temporary password: "))
        .unwrap()
        .to_string();

    let old = sign_in(&user.user_id, fixtures::TEST_PASSWORD, &ctx.deps).await;
    assert!(old.is_err());
    let with_temp = sign_in(&user.user_id, &temp_password, &ctx.deps)
        .await
        .unwrap();
    assert!(with_temp.password_change_required);

    update_password(&user.user_id, "brand new secret", &ctx.db_pool)
        .await
        .unwrap();
    let fresh = sign_in(&user.user_id, "brand new secret", &ctx.deps)
        .await
        .unwrap();
    assert!(!fresh.password_change_required);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn recovery_mail_failures_leave_the_password_alone(ctx: &TestHarness) {
    let user = fixtures::create_user(&ctx.db_pool, "mina").await.unwrap();
    ctx.mailer.set_failing(true);

    let result = find_password(&user.user_id, &user.email, &ctx.deps).await;

    assert!(matches!(result, Err(DomainError::Internal(_))));
    sign_in(&user.user_id, fixtures::TEST_PASSWORD, &ctx.deps)
        .await
        .unwrap();

    let mismatch = find_password(&user.user_id, "someone@else.com", &ctx.deps).await;
    assert!(matches!(mismatch, Err(DomainError::NotFound { .. })));
}
