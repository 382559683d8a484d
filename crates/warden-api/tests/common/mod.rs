//! Shared harness for API integration tests: the full router wired to the
//! in-memory stores, a manual clock, and the mail outbox receiver.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tower::ServiceExt;

use warden_api::{AppState, build_router};
use warden_auth::{PasswordHasher, normalize_email};
use warden_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, InvitationConfig, LoggingConfig, MailConfig,
    ServerConfig, SessionConfig,
};
use warden_core::traits::{Clock, MailMessage, ManualClock};
use warden_database::Repositories;
use warden_entity::user::CreateUser;
use warden_service::MailOutbox;

pub const ADMIN_EMAIL: &str = "admin@warden.test";
pub const ADMIN_PASSWORD: &str = "admin-pass";

pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
    pub clock: Arc<ManualClock>,
    inbox: Mutex<mpsc::Receiver<MailMessage>>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "memory".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            ..AuthConfig::default()
        },
        session: SessionConfig::default(),
        invitation: InvitationConfig::default(),
        mail: MailConfig {
            base_url: "https://warden.test".to_string(),
            ..MailConfig::default()
        },
        logging: LoggingConfig::default(),
        bootstrap: None,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let repos = Repositories::memory();
        let (outbox, inbox) = MailOutbox::channel(64);

        let password_hash = PasswordHasher::new().hash_password(ADMIN_PASSWORD).unwrap();
        repos
            .users
            .create(
                &CreateUser {
                    username: "admin".to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    password_hash,
                },
                clock.now(),
            )
            .await
            .unwrap();

        let state = AppState::build(test_config(), repos.clone(), outbox, clock.clone()).unwrap();

        Self {
            router: build_router(state),
            repos,
            clock,
            inbox: Mutex::new(inbox),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Logs in and returns the access token and the `refresh_token=...` pair.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .send(post_json(
                "/api/auth/login",
                serde_json::json!({"email": email, "password": password}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = refresh_cookie_of(&response).expect("login sets the refresh cookie");
        let body = body_json(response).await;
        let access = body["access_token"].as_str().unwrap().to_string();
        (access, cookie)
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.0
    }

    pub async fn invitation_token(&self, email: &str) -> String {
        self.repos
            .invitations
            .find_latest_by_email(&normalize_email(email))
            .await
            .unwrap()
            .expect("invitation exists")
            .token
    }

    pub async fn next_mail(&self) -> Option<MailMessage> {
        self.inbox.lock().await.try_recv().ok()
    }

    /// Invites, accepts, and registers a user through the API.
    pub async fn register(&self, username: &str, email: &str, password: &str) {
        let admin = self.admin_token().await;
        let response = self
            .send(with_bearer(
                post_json("/api/invitations", serde_json::json!({"email": email})),
                &admin,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let token = self.invitation_token(email).await;
        let response = self.send(get(&format!("/api/invitations/accept?token={token}"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = self
            .send(post_json(
                "/api/auth/register",
                serde_json::json!({"username": username, "email": email, "password": password}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

/// Full `Set-Cookie` header value for the refresh cookie, if any.
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refresh_token="))
        .map(String::from)
}

/// The `refresh_token=<value>` pair from the response, ready to send back.
pub fn refresh_cookie_of(response: &Response<Body>) -> Option<String> {
    set_cookie_header(response)
        .and_then(|v| v.split(';').next().map(str::to_string))
        .filter(|pair| pair != "refresh_token=")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
