//! Invitation issuance, acceptance, and the registration gate over HTTP.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use common::*;

async fn invite(app: &TestApp, access: &str, email: &str) -> axum::http::Response<axum::body::Body> {
    app.send(with_bearer(
        post_json("/api/invitations", json!({"email": email})),
        access,
    ))
    .await
}

#[tokio::test]
async fn creating_an_invitation_requires_authentication() {
    let app = TestApp::new().await;

    let response = app
        .send(post_json(
            "/api/invitations",
            json!({"email": "carol@example.com"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.next_mail().await.is_none());
}

#[tokio::test]
async fn invitation_is_created_and_mailed() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;

    let response = invite(&app, &access, "Carol@Example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["email"], "carol@example.com");
    assert_eq!(body["status"], "pending");
    assert!(body["expires_at"].is_string());
    assert!(body.get("token").is_none());

    let token = app.invitation_token("carol@example.com").await;
    let mail = app.next_mail().await.expect("invitation mail handed off");
    assert_eq!(mail.to, "carol@example.com");
    assert!(
        mail.text_body
            .contains(&format!("https://warden.test/api/invitations/accept?token={token}"))
    );
    assert!(mail.text_body.contains("48 hours"));
}

#[tokio::test]
async fn duplicate_invitations_are_refused() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;

    assert_eq!(
        invite(&app, &access, "dave@example.com").await.status(),
        StatusCode::CREATED
    );

    let response = invite(&app, &access, "dave@example.com").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "validation_error");

    let token = app.invitation_token("dave@example.com").await;
    app.send(get(&format!("/api/invitations/accept?token={token}")))
        .await;

    let response = invite(&app, &access, "dave@example.com").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_invitee_address_is_rejected() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;

    let response = invite(&app, &access, "not-an-address").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expired_invitation_is_reissued_with_a_new_token() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;
    invite(&app, &access, "erin@example.com").await;
    let old_token = app.invitation_token("erin@example.com").await;

    app.clock.advance(Duration::hours(49));
    let access = app.admin_token().await;
    let response = invite(&app, &access, "erin@example.com").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let new_token = app.invitation_token("erin@example.com").await;
    assert_ne!(old_token, new_token);

    let response = app
        .send(get(&format!("/api/invitations/accept?token={old_token}")))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(get(&format!("/api/invitations/accept?token={new_token}")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn accepting_works_exactly_once() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;
    invite(&app, &access, "frank@example.com").await;
    let token = app.invitation_token("frank@example.com").await;
    let uri = format!("/api/invitations/accept?token={token}");

    let response = app.send(get(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Invitation accepted"})
    );

    let response = app.send(get(&uri)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn accepting_an_expired_invitation_fails() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;
    invite(&app, &access, "gina@example.com").await;
    let token = app.invitation_token("gina@example.com").await;

    app.clock.advance(Duration::hours(48));
    let response = app
        .send(get(&format!("/api/invitations/accept?token={token}")))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn accept_without_or_with_unknown_token() {
    let app = TestApp::new().await;

    let response = app.send(get("/api/invitations/accept")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(get("/api/invitations/accept?token=bogus"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_requires_an_accepted_invitation() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;
    let register = |email: &str| {
        post_json(
            "/api/auth/register",
            json!({"username": "hank", "email": email, "password": "s3cret!"}),
        )
    };

    let response = app.send(register("hank@example.com")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    invite(&app, &access, "hank@example.com").await;
    let response = app.send(register("hank@example.com")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let token = app.invitation_token("hank@example.com").await;
    app.send(get(&format!("/api/invitations/accept?token={token}")))
        .await;
    let response = app.send(register("hank@example.com")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.send(register("hank@example.com")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn registration_enforces_password_rules() {
    let app = TestApp::new().await;
    let access = app.admin_token().await;
    invite(&app, &access, "ivy@example.com").await;
    let token = app.invitation_token("ivy@example.com").await;
    app.send(get(&format!("/api/invitations/accept?token={token}")))
        .await;

    for password in ["short", "this-password-is-far-too-long"] {
        let response = app
            .send(post_json(
                "/api/auth/register",
                json!({"username": "ivy", "email": "ivy@example.com", "password": password}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
